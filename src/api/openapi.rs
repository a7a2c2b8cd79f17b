use super::handlers::{auth, health, setup};
use utoipa::openapi::{
    ContactBuilder, Info, InfoBuilder, LicenseBuilder, OpenApi, OpenApiBuilder, Tag,
};
use utoipa_axum::{router::OpenApiRouter, routes};

/// The generated document, without the router.
#[must_use]
pub fn openapi() -> OpenApi {
    api_router().split_for_parts().1
}

/// JSON endpoints, registered so that every handler also lands in the
/// document. Pages and `/openapi.json` itself are mounted by [`super::app`].
pub(crate) fn api_router() -> OpenApiRouter {
    let mut router = OpenApiRouter::with_openapi(OpenApiBuilder::new().info(package_info()).build())
        .routes(routes!(health::health))
        .routes(routes!(setup::status))
        .routes(routes!(auth::keyword::keyword))
        .routes(routes!(auth::login::login))
        .routes(routes!(auth::session::logout))
        .routes(routes!(auth::session::session));

    router.get_openapi_mut().tags = Some(vec![
        described_tag("auth", "Admin login, session and keyword check"),
        described_tag("setup", "First-run configuration status"),
        Tag::new("health"),
    ]);

    router
}

fn described_tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

/// Title, version, contact and license straight from `Cargo.toml`.
fn package_info() -> Info {
    let (author_name, author_email) = env!("CARGO_PKG_AUTHORS")
        .split(';')
        .next()
        .map_or((None, None), parse_author);

    let contact = (author_name.is_some() || author_email.is_some()).then(|| {
        ContactBuilder::new()
            .name(author_name)
            .email(author_email)
            .build()
    });

    let license = non_empty(env!("CARGO_PKG_LICENSE")).map(|spdx| {
        LicenseBuilder::new()
            .name(spdx)
            .identifier(Some(spdx))
            .build()
    });

    InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(non_empty(env!("CARGO_PKG_DESCRIPTION")))
        .contact(contact)
        .license(license)
        .build()
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|trimmed| !trimmed.is_empty())
}

/// Split `"Name <email>"`; either half may be missing.
fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, email)) => (non_empty(name), non_empty(email.trim_end_matches('>'))),
        None => (non_empty(author), None),
    }
}
