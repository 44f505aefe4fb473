use std::collections::HashMap;
use std::sync::Arc;

use ct_codecs::{Base64, Decoder};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::imp::svg::{SvgRenderer, SVG_DATA_URI_PREFIX};
use super::imp::template_loader::{HttpTemplateLoader, Params, StaticTemplateLoader};
use super::{
    error::RenderError, CredentialImageRenderer, PlaceholderValue, TemplateLoader, TemplateSource,
};
use crate::http_client::imp::reqwest_client::ReqwestClient;

fn decode(data_uri: &str) -> String {
    let encoded = data_uri.strip_prefix(SVG_DATA_URI_PREFIX).unwrap();
    String::from_utf8(Base64::decode_to_vec(encoded, None).unwrap()).unwrap()
}

#[test]
fn test_fill_replaces_known_and_blanks_unknown_placeholders() {
    let template = concat!(
        "<svg><text>{{legal_name}}</text>",
        "<text>{{ full_powers }}</text><text>{{unknown}}</text></svg>"
    );

    let filled = SvgRenderer::fill(
        template,
        &[
            PlaceholderValue::new("legal_name", "Acme Corp"),
            PlaceholderValue::new("full_powers", "true"),
        ],
    )
    .unwrap();

    assert_eq!(
        "<svg><text>Acme Corp</text><text>true</text><text></text></svg>",
        filled
    );
}

#[test]
fn test_fill_escapes_values() {
    let filled = SvgRenderer::fill(
        "<text>{{name}}</text>",
        &[PlaceholderValue::new("name", "Smith & <Sons>")],
    )
    .unwrap();

    assert_eq!("<text>Smith &amp; &lt;Sons&gt;</text>", filled);
}

#[test]
fn test_fill_rejects_unterminated_placeholder() {
    let result = SvgRenderer::fill("<text>{{name</text>", &[]);

    assert!(matches!(result, Err(RenderError::InvalidTemplate(_))));
}

#[test]
fn test_render_produces_data_uri() {
    let data_uri = SvgRenderer
        .render("<svg>{{a}}</svg>", &[PlaceholderValue::new("a", "1")])
        .unwrap();

    assert!(data_uri.starts_with(SVG_DATA_URI_PREFIX));
    assert_eq!("<svg>1</svg>", decode(&data_uri));
}

#[tokio::test]
async fn test_http_loader_fetches_template() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/template.svg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<svg>{{legal_name}}</svg>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let loader = HttpTemplateLoader::new(Arc::new(ReqwestClient::default()), Params::default());

    let template = loader
        .load(&TemplateSource::Uri {
            uri: format!("{}/images/template.svg", mock_server.uri()),
        })
        .await
        .unwrap();

    assert_eq!("<svg>{{legal_name}}</svg>", template);
}

#[tokio::test]
async fn test_http_loader_surfaces_unavailable_template() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let loader = HttpTemplateLoader::new(Arc::new(ReqwestClient::default()), Params::default());

    let result = loader
        .load(&TemplateSource::Uri {
            uri: format!("{}/images/template.svg", mock_server.uri()),
        })
        .await;

    assert!(matches!(result, Err(RenderError::TemplateUnavailable(_))));
}

#[tokio::test]
async fn test_loaders_decode_data_uri() {
    let source = TemplateSource::Uri {
        uri: "data:image/svg+xml;base64,PHN2Zz48L3N2Zz4=".to_owned(),
    };

    let loader = StaticTemplateLoader::default();
    assert_eq!("<svg></svg>", loader.load(&source).await.unwrap());
}

#[tokio::test]
async fn test_static_loader() {
    let loader = StaticTemplateLoader::new(HashMap::from([(
        "https://issuer.example/template.svg".to_owned(),
        "<svg/>".to_owned(),
    )]));

    assert_eq!(
        "<svg/>",
        loader
            .load(&TemplateSource::Uri {
                uri: "https://issuer.example/template.svg".to_owned()
            })
            .await
            .unwrap()
    );
    assert_eq!(
        Err(RenderError::TemplateUnavailable("https://other.example".to_owned())),
        loader
            .load(&TemplateSource::Uri {
                uri: "https://other.example".to_owned()
            })
            .await
    );
}
