use std::sync::{Arc, Mutex};

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use tarot_api::{routes, state::AppState};
use tarot_config::{CompletionProviderConfig, Config, EmbeddingProviderConfig, ProviderConfig};
use tarot_domain::{
	astrology::{AstrologyFacts, BirthMoment},
	prompt::Prompt,
};
use tarot_service::{
	AstrologyProvider, BoxFuture, CompletionProvider, EmbeddingProvider, Error, MemoryStore,
	Providers, Result, TarotService,
};

const TEST_CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:0"
log_level = "info"
cors_allowed_origins = ["http://localhost:3000"]

[storage.postgres]
dsn = "postgres://unused"
pool_max_conns = 1
vector_dim = 2

[providers.embedding]
provider_id = "test"
api_base = "http://127.0.0.1:1"
api_key = "test"
path = "/v1/embeddings"
model = "test"
dimensions = 2
timeout_ms = 1000

[providers.completion]
provider_id = "test"
api_base = "http://127.0.0.1:1"
api_key = "test"
path = "/v1/chat/completions"
model = "test"
temperature = 0.7
max_tokens = 800
timeout_ms = 1000

[providers.astrology]
provider_id = "test"
api_base = "http://127.0.0.1:1"
path = "/v1/natal-chart"
timeout_ms = 1000
"#;

struct UnitEmbedding;
impl EmbeddingProvider for UnitEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok::<_, Error>(vec![vec![1.0_f32, 0.0]; texts.len()]) })
	}
}

struct EchoCompletion;
impl CompletionProvider for EchoCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a CompletionProviderConfig,
		prompt: &'a Prompt,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok::<_, Error>(prompt.user.clone()) })
	}
}

struct OfflineAstrology;
impl AstrologyProvider for OfflineAstrology {
	fn chart<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_moment: &'a BirthMoment,
	) -> BoxFuture<'a, Result<AstrologyFacts>> {
		Box::pin(async move {
			Err::<AstrologyFacts, _>(Error::Provider { message: "offline".to_string() })
		})
	}
}

#[derive(Default)]
struct RecordingStore {
	saved: Mutex<Vec<String>>,
}
impl MemoryStore for RecordingStore {
	fn save<'a>(
		&'a self,
		user_id: &'a str,
		_consultation_text: &'a str,
		_embedding: &'a [f32],
	) -> BoxFuture<'a, Result<Uuid>> {
		Box::pin(async move {
			self.saved.lock().expect("store lock poisoned").push(user_id.to_string());

			Ok::<_, Error>(Uuid::new_v4())
		})
	}

	fn retrieve<'a>(
		&'a self,
		_user_id: &'a str,
		_embedding: &'a [f32],
		_top_k: u32,
		_threshold: f32,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move { Ok::<Vec<String>, Error>(Vec::new()) })
	}
}

fn app_with(config_toml: &str, store: Arc<RecordingStore>) -> Router {
	let config: Config = toml::from_str(config_toml).expect("Failed to parse test config.");
	let providers = Providers::new(
		Arc::new(UnitEmbedding),
		Arc::new(EchoCompletion),
		Arc::new(OfflineAstrology),
	);
	let service = TarotService::with_providers(config, providers, store);

	routes::router(AppState::from_service(service))
}

fn app() -> Router {
	app_with(TEST_CONFIG_TOML, Arc::new(RecordingStore::default()))
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.oneshot(request).await.expect("Failed to call the router.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

	(status, json)
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request.")
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

#[tokio::test]
async fn root_reports_online() {
	let (status, json) = call(app(), get("/")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["status"], "online");
	assert_eq!(json["version"], tarot_cli::VERSION);
}

#[tokio::test]
async fn health_carries_an_rfc3339_timestamp() {
	let (status, json) = call(app(), get("/health")).await;
	let timestamp = json["timestamp"].as_str().expect("Missing timestamp.");

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["status"], "healthy");
	assert!(
		time::OffsetDateTime::parse(timestamp, &time::format_description::well_known::Rfc3339)
			.is_ok()
	);
}

#[tokio::test]
async fn persona_listing_has_keys_and_details() {
	let (status, json) = call(app(), get("/vozes-guru")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["vozes"], serde_json::json!(["companheira", "mistica", "sábia"]));
	assert_eq!(json["detalhes"]["companheira"]["nome"], "Guru Companheira");
}

#[tokio::test]
async fn reading_without_birth_data_returns_three_cards() {
	let payload = serde_json::json!({ "pergunta": "Vou viajar este ano?" });
	let (status, json) = call(app(), post_json("/consulta-tarot", &payload)).await;
	let cards = json["cartas"].as_array().expect("Missing cards.");

	assert_eq!(status, StatusCode::OK);
	assert_eq!(cards.len(), 3);
	assert!(json["elementos_astrologicos"].is_null());
	assert!(cards.iter().all(|card| card["arcano"] == "Maior"));
	let text = json["interpretacao"].as_str().expect("Missing text.");

	assert!(text.contains("Vou viajar este ano?"));
}

#[tokio::test]
async fn reading_survives_an_offline_ephemeris() {
	let payload = serde_json::json!({
		"pergunta": "Vou viajar este ano?",
		"dados_nascimento": {
			"nome": "Ana",
			"data_nascimento": "1990-06-15",
			"hora_nascimento": "14:30",
			"local_nascimento": "Curitiba, Brasil"
		},
		"voz_guru": "mistica"
	});
	let (status, json) = call(app(), post_json("/consulta-tarot", &payload)).await;

	assert_eq!(status, StatusCode::OK);
	assert!(json["elementos_astrologicos"].is_null());
}

#[tokio::test]
async fn blank_question_is_unprocessable() {
	let payload = serde_json::json!({ "pergunta": "   " });
	let (status, json) = call(app(), post_json("/consulta-tarot", &payload)).await;

	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
	let request = Request::builder()
		.method("POST")
		.uri("/consulta-tarot")
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from("{not json"))
		.expect("Failed to build request.");
	let (status, _) = call(app(), request).await;

	assert!(status.is_client_error());
}

#[tokio::test]
async fn guided_consultation_answers_and_saves() {
	let store = Arc::new(RecordingStore::default());
	let payload = serde_json::json!({
		"user_id": "user-42",
		"pergunta": "Devo aceitar a proposta?",
		"cartas": ["A Roda da Fortuna (Invertida)", "O Mago (Direita)", "Os Enamorados (Direita)"],
		"astrologia": { "sol": "Gêmeos", "lua": "Libra", "ascendente": "Leão" }
	});
	let app = app_with(TEST_CONFIG_TOML, store.clone());
	let (status, json) = call(app, post_json("/consulta-guru", &payload)).await;
	let answer = json["resposta_guru"].as_str().expect("Missing answer.");

	assert_eq!(status, StatusCode::OK);
	assert!(answer.contains("Devo aceitar a proposta?"));
	assert!(answer.contains("O Mago (Direita)"));
	assert!(answer.contains("Gêmeos"));
	assert_eq!(*store.saved.lock().expect("store lock poisoned"), vec!["user-42".to_string()]);
}

#[tokio::test]
async fn guided_consultation_requires_a_user() {
	let payload = serde_json::json!({ "user_id": "", "pergunta": "Q?" });
	let (status, json) = call(app(), post_json("/consulta-guru", &payload)).await;

	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn internal_failures_return_a_correlation_id() {
	let config = format!("{TEST_CONFIG_TOML}\n[reading]\ndraw_count = 30\n");
	let payload = serde_json::json!({ "pergunta": "Q?" });
	let (status, json) = call(
		app_with(&config, Arc::new(RecordingStore::default())),
		post_json("/consulta-tarot", &payload),
	)
	.await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(json["error_code"], "INTERNAL_ERROR");
	assert!(json["correlation_id"].as_str().and_then(|id| Uuid::parse_str(id).ok()).is_some());
	assert!(!json["message"].as_str().unwrap_or_default().contains("InvalidCount"));
}

#[tokio::test]
async fn cors_allows_the_configured_frontend() {
	let cors = tarot_api::cors_layer(&["http://localhost:3000".to_string()])
		.expect("Failed to build CORS layer.");
	let request = Request::builder()
		.method("OPTIONS")
		.uri("/consulta-tarot")
		.header(header::ORIGIN, "http://localhost:3000")
		.header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
		.body(Body::empty())
		.expect("Failed to build request.");
	let response = app().layer(cors).oneshot(request).await.expect("Failed to call the router.");

	assert_eq!(
		response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).map(|value| value.as_bytes()),
		Some(&b"http://localhost:3000"[..])
	);
}
