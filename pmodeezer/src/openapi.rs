//! Documentation OpenAPI du proxy Deezer

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::api::relay_endpoint),
    components(schemas(crate::api::ErrorResponse)),
    tags(
        (name = "deezer", description = "Relais vers l'API catalogue Deezer")
    ),
    info(
        title = "PMO Deezer Proxy",
        version = "0.1.0",
        description = r#"
# Proxy catalogue

Relaie un chemin d'endpoint Deezer (`/search?q=...`, `/track/{id}`,
`/artist/{id}`, `/artist/{id}/top?limit=n`, `/album/{id}`,
`/chart/0/tracks?limit=n`) et ajoute
`Cache-Control: public, s-maxage=300, stale-while-revalidate=600`.
        "#,
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;
