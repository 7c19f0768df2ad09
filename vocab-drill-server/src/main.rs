use std::env;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use actix_cors::Cors;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, ResponseError, get, middleware, post, web};

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use vocab_drill_core::error::QuizError;
use vocab_drill_core::quiz::session::{NextOutcome, Stats};
use vocab_drill_core::quiz::{QuizMode, QuizStyle, VocabList};

mod store;

use store::SessionStore;

/// Cookie carrying the opaque session identifier.
const SESSION_COOKIE: &str = "vocab_drill_session";

/// Request body for the `/api/upload` endpoint: file contents are
/// carried inline, one entry per uploaded file.
#[derive(Deserialize)]
struct UploadRequest {
	files: Vec<UploadedFile>,
}

#[derive(Deserialize)]
struct UploadedFile {
	name: String,
	content: String,
}

/// Request body for the `/api/start-quiz` endpoint.
///
/// Missing fields fall back to the defaults: recall style, continuous
/// mode, 10 questions.
#[derive(Deserialize)]
struct StartQuizRequest {
	quiz_type: Option<QuizStyle>,
	mode: Option<QuizMode>,
	num_questions: Option<usize>,
}

/// Request body for the `/api/submit-answer` endpoint.
#[derive(Deserialize)]
struct SubmitAnswerRequest {
	answer: Option<String>,
	question_id: Option<i64>,
}

/// Boundary errors: everything an endpoint can report to the client.
///
/// Engine errors pass through; the two extra variants cover failures
/// that only exist at the transport layer.
#[derive(Error, Debug)]
enum ApiError {
	#[error("No files provided")]
	EmptyUpload,

	#[error("Session lock failed")]
	LockPoisoned,

	#[error(transparent)]
	Quiz(#[from] QuizError),
}

impl ResponseError for ApiError {
	fn status_code(&self) -> StatusCode {
		match self {
			ApiError::Quiz(QuizError::SessionNotFound) => StatusCode::NOT_FOUND,
			ApiError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
			_ => StatusCode::BAD_REQUEST,
		}
	}

	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
	}
}

/// Locks the shared session store.
fn lock(data: &web::Data<Mutex<SessionStore>>) -> Result<MutexGuard<'_, SessionStore>, ApiError> {
	data.lock().map_err(|_| ApiError::LockPoisoned)
}

/// Reads the session identifier from the request cookie.
fn session_id(req: &HttpRequest) -> Result<String, ApiError> {
	match req.cookie(SESSION_COOKIE) {
		Some(cookie) => Ok(cookie.value().to_owned()),
		None => Err(QuizError::SessionNotFound.into()),
	}
}

/// HTTP POST endpoint `/api/upload`
///
/// Parses the supplied vocabulary files and stores them on the client's
/// session, replacing any earlier upload. A new session is created (and
/// its cookie set) when the client does not carry a live one yet.
#[post("/api/upload")]
async fn upload_files(
	req: HttpRequest,
	data: web::Data<Mutex<SessionStore>>,
	body: web::Json<UploadRequest>,
) -> Result<HttpResponse, ApiError> {
	if body.files.is_empty() {
		return Err(ApiError::EmptyUpload);
	}

	let mut parsed = Vec::with_capacity(body.files.len());
	for file in &body.files {
		let terms = VocabList::parse(file.content.as_bytes())?;
		parsed.push((file.name.clone(), terms));
	}

	let mut store = lock(&data)?;
	let id = match req.cookie(SESSION_COOKIE) {
		Some(cookie) if store.get_mut(cookie.value()).is_ok() => cookie.value().to_owned(),
		_ => store.create(),
	};

	let session_data = store.get_mut(&id)?;
	let names: Vec<String> = parsed.iter().map(|(name, _)| name.clone()).collect();
	session_data.uploads = parsed;

	log::info!("Stored {} vocabulary file(s) for session {}", names.len(), id);

	let mut response = HttpResponse::Ok();
	response.cookie(
		Cookie::build(SESSION_COOKIE, id)
			.path("/")
			.http_only(true)
			.finish(),
	);
	Ok(response.json(json!({
		"message": "Files uploaded successfully",
		"files": names,
	})))
}

/// HTTP POST endpoint `/api/start-quiz`
///
/// Merges the session's uploads into one vocabulary list and starts the
/// quiz with the requested style and mode.
#[post("/api/start-quiz")]
async fn start_quiz(
	req: HttpRequest,
	data: web::Data<Mutex<SessionStore>>,
	body: web::Json<StartQuizRequest>,
) -> Result<HttpResponse, ApiError> {
	let style = body.quiz_type.unwrap_or(QuizStyle::Recall);
	let mode = body.mode.unwrap_or(QuizMode::Continuous);
	let requested = body.num_questions.unwrap_or(10);

	let mut store = lock(&data)?;
	let session_data = store.get_mut(&session_id(&req)?)?;

	if session_data.uploads.is_empty() {
		return Err(QuizError::NoVocabulary.into());
	}

	let vocab = VocabList::merge(session_data.uploads.iter().map(|(_, terms)| terms.clone()))?;
	session_data.session.load_vocabulary(vocab);
	let started = session_data.session.start(style, mode, requested)?;

	log::info!(
		"Quiz started: {:?}/{:?}, {} question(s)",
		style,
		mode,
		started.total_questions
	);

	Ok(HttpResponse::Ok().json(json!({
		"message": "Quiz started",
		"total_pairs": started.total_pairs,
		"total_questions": started.total_questions,
	})))
}

/// HTTP GET endpoint `/api/get-question`
///
/// Serves the next question, or `{"quiz_complete": true}` once the
/// mode's termination condition holds.
#[get("/api/get-question")]
async fn get_question(
	req: HttpRequest,
	data: web::Data<Mutex<SessionStore>>,
) -> Result<HttpResponse, ApiError> {
	let mut store = lock(&data)?;
	let session_data = store.get_mut(&session_id(&req)?)?;

	let mut rng = rand::rng();
	match session_data.session.next_question(&mut rng)? {
		NextOutcome::QuizComplete => Ok(HttpResponse::Ok().json(json!({ "quiz_complete": true }))),
		NextOutcome::Question { question, number, total } => {
			let mut payload = json!({
				"question_number": number,
				"total_questions": total,
				"question": question.prompt(),
				"question_id": question.reference(),
			});
			if let Some(options) = question.options() {
				payload["options"] = json!(options);
			}
			Ok(HttpResponse::Ok().json(payload))
		}
	}
}

/// HTTP POST endpoint `/api/submit-answer`
///
/// Grades the submitted answer against the echoed `question_id` and
/// advances the session counters.
#[post("/api/submit-answer")]
async fn submit_answer(
	req: HttpRequest,
	data: web::Data<Mutex<SessionStore>>,
	body: web::Json<SubmitAnswerRequest>,
) -> Result<HttpResponse, ApiError> {
	let reference = match body.question_id {
		Some(id) if id >= 0 => id as usize,
		Some(id) => {
			return Err(QuizError::InvalidReference(format!("Negative position {}", id)).into());
		}
		None => return Err(QuizError::InvalidReference("Missing question_id".to_owned()).into()),
	};
	let answer = body.answer.as_deref().unwrap_or("");

	let mut store = lock(&data)?;
	let session_data = store.get_mut(&session_id(&req)?)?;

	let answered = session_data.session.submit_answer(reference, answer)?;

	Ok(HttpResponse::Ok().json(json!({
		"correct": answered.is_correct,
		"correct_answer": answered.expected_answer,
		"total_correct": answered.correct_count,
	})))
}

/// HTTP GET endpoint `/api/quiz-stats`
///
/// Reports the progress counters. A client without a live session gets
/// all zeros rather than an error, so the results page stays harmless
/// to refresh.
#[get("/api/quiz-stats")]
async fn quiz_stats(
	req: HttpRequest,
	data: web::Data<Mutex<SessionStore>>,
) -> Result<HttpResponse, ApiError> {
	let mut store = lock(&data)?;

	let stats = match req.cookie(SESSION_COOKIE) {
		Some(cookie) => match store.get_mut(cookie.value()) {
			Ok(session_data) => session_data.session.stats(),
			Err(_) => Stats::default(),
		},
		None => Stats::default(),
	};

	Ok(HttpResponse::Ok().json(stats))
}

/// HTTP POST endpoint `/api/reset`
///
/// Drops the client's session entirely. Resetting without a session is
/// acknowledged all the same.
#[post("/api/reset")]
async fn reset_session(
	req: HttpRequest,
	data: web::Data<Mutex<SessionStore>>,
) -> Result<HttpResponse, ApiError> {
	if let Some(cookie) = req.cookie(SESSION_COOKIE) {
		lock(&data)?.remove(cookie.value());
	}
	Ok(HttpResponse::Ok().json(json!({ "message": "Session reset" })))
}

/// Registers every endpoint, shared between the server and the tests.
fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(upload_files)
		.service(start_quiz)
		.service(get_question)
		.service(submit_answer)
		.service(quiz_stats)
		.service(reset_session);
}

/// Server settings read from the environment.
struct ServerConfig {
	addr: String,
	session_ttl: Duration,
}

/// Loads settings, falling back to the defaults: 127.0.0.1:5000 and a
/// 30 minute idle TTL.
fn load_config() -> ServerConfig {
	let addr = env::var("VOCAB_DRILL_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_owned());
	let session_ttl = env::var("VOCAB_DRILL_SESSION_TTL_SECS")
		.ok()
		.and_then(|value| value.parse().ok())
		.map(Duration::from_secs)
		.unwrap_or_else(|| Duration::from_secs(30 * 60));

	ServerConfig { addr, session_ttl }
}

/// Main entry point for the server.
///
/// Builds the shared session store, wraps it in a `Mutex` so concurrent
/// requests against one session are serialized, and starts the
/// Actix-web HTTP server with permissive CORS.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	dotenv::dotenv().ok();
	env_logger::init();

	let config = load_config();
	let store = web::Data::new(Mutex::new(SessionStore::new(config.session_ttl)));

	log::info!("Vocabulary quiz server listening on http://{}", config.addr);

	HttpServer::new(move || {
		App::new()
			.app_data(store.clone())
			.wrap(Cors::permissive())
			.wrap(middleware::Logger::default())
			.configure(configure)
	})
	.bind(config.addr)?
	.run()
	.await
}

#[cfg(test)]
mod tests {
	use actix_web::cookie::Cookie;
	use actix_web::dev::{Service, ServiceResponse};
	use actix_web::{App, test, web};
	use serde_json::Value;

	use super::*;

	const SAMPLE_FILE: &str = "French\nEnglish\nchat\ncat\nchien\ndog\n";

	async fn service() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
		let store = web::Data::new(Mutex::new(SessionStore::new(Duration::from_secs(60))));
		test::init_service(App::new().app_data(store).configure(configure)).await
	}

	async fn upload<S>(app: &S) -> Cookie<'static>
	where
		S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
	{
		let req = test::TestRequest::post()
			.uri("/api/upload")
			.set_json(json!({ "files": [{ "name": "list.txt", "content": SAMPLE_FILE }] }))
			.to_request();
		let resp = test::call_service(app, req).await;
		assert!(resp.status().is_success());
		resp.response()
			.cookies()
			.next()
			.expect("upload sets the session cookie")
			.into_owned()
	}

	async fn start<S>(app: &S, cookie: &Cookie<'static>, body: Value) -> Value
	where
		S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
	{
		let req = test::TestRequest::post()
			.uri("/api/start-quiz")
			.cookie(cookie.clone())
			.set_json(body)
			.to_request();
		let resp = test::call_service(app, req).await;
		assert!(resp.status().is_success());
		test::read_body_json(resp).await
	}

	async fn next_question<S>(app: &S, cookie: &Cookie<'static>) -> Value
	where
		S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
	{
		let req = test::TestRequest::get()
			.uri("/api/get-question")
			.cookie(cookie.clone())
			.to_request();
		let resp = test::call_service(app, req).await;
		assert!(resp.status().is_success());
		test::read_body_json(resp).await
	}

	fn correct_answer_for(prompt: &str) -> &'static str {
		match prompt {
			"chat" => "cat",
			"chien" => "dog",
			other => panic!("unexpected prompt {other}"),
		}
	}

	#[actix_web::test]
	async fn upload_reports_stored_files() {
		let app = service().await;
		let req = test::TestRequest::post()
			.uri("/api/upload")
			.set_json(json!({ "files": [{ "name": "list.txt", "content": SAMPLE_FILE }] }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert!(resp.status().is_success());

		let body: Value = test::read_body_json(resp).await;
		assert_eq!(body["files"], json!(["list.txt"]));
	}

	#[actix_web::test]
	async fn upload_without_files_is_rejected() {
		let app = service().await;
		let req = test::TestRequest::post()
			.uri("/api/upload")
			.set_json(json!({ "files": [] }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn recall_round_trip_grades_case_insensitively() {
		let app = service().await;
		let cookie = upload(&app).await;

		let started = start(
			&app,
			&cookie,
			json!({ "quiz_type": "recall", "mode": "fixed_count", "num_questions": 1 }),
		)
		.await;
		assert_eq!(started["total_questions"], json!(1));
		assert_eq!(started["total_pairs"], json!(2));

		let question = next_question(&app, &cookie).await;
		assert_eq!(question["question_number"], json!(1));
		assert!(question.get("options").is_none());
		let prompt = question["question"].as_str().unwrap();
		let answer = correct_answer_for(prompt).to_uppercase();

		let req = test::TestRequest::post()
			.uri("/api/submit-answer")
			.cookie(cookie.clone())
			.set_json(json!({ "answer": answer, "question_id": question["question_id"] }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert!(resp.status().is_success());
		let graded: Value = test::read_body_json(resp).await;
		assert_eq!(graded["correct"], json!(true));
		assert_eq!(graded["total_correct"], json!(1));
		assert_eq!(graded["correct_answer"].as_str().unwrap(), correct_answer_for(prompt));

		// The single requested question has been answered
		let complete = next_question(&app, &cookie).await;
		assert_eq!(complete["quiz_complete"], json!(true));

		// A late submission is rejected, not counted
		let req = test::TestRequest::post()
			.uri("/api/submit-answer")
			.cookie(cookie.clone())
			.set_json(json!({ "answer": "cat", "question_id": 1 }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::get()
			.uri("/api/quiz-stats")
			.cookie(cookie.clone())
			.to_request();
		let stats: Value = test::read_body_json(test::call_service(&app, req).await).await;
		assert_eq!(stats["answered_count"], json!(1));
		assert_eq!(stats["correct_count"], json!(1));
		assert_eq!(stats["total_questions"], json!(1));
	}

	#[actix_web::test]
	async fn multiple_choice_serves_options_with_the_target() {
		let app = service().await;
		let cookie = upload(&app).await;

		let started = start(
			&app,
			&cookie,
			json!({ "quiz_type": "multiple_choice", "mode": "exhaustive" }),
		)
		.await;
		assert_eq!(started["total_questions"], json!(2));

		let question = next_question(&app, &cookie).await;
		let prompt = question["question"].as_str().unwrap();
		let options: Vec<&str> = question["options"]
			.as_array()
			.unwrap()
			.iter()
			.map(|o| o.as_str().unwrap())
			.collect();

		assert!(!options.is_empty() && options.len() <= 4);
		assert!(options.contains(&correct_answer_for(prompt)));
		for (i, option) in options.iter().enumerate() {
			assert!(!options[i + 1..].contains(option), "duplicate option {option}");
		}
	}

	#[actix_web::test]
	async fn start_without_vocabulary_is_rejected() {
		let app = service().await;

		// Upload a file whose only term survives header stripping:
		// one term is not enough to form a pair
		let req = test::TestRequest::post()
			.uri("/api/upload")
			.set_json(json!({ "files": [{ "name": "short.txt", "content": "h1\nh2\nchat\n" }] }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		let cookie = resp.response().cookies().next().unwrap().into_owned();

		let req = test::TestRequest::post()
			.uri("/api/start-quiz")
			.cookie(cookie)
			.set_json(json!({ "quiz_type": "recall", "mode": "continuous" }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn missing_session_is_surfaced() {
		let app = service().await;
		let req = test::TestRequest::get().uri("/api/get-question").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::get()
			.uri("/api/get-question")
			.cookie(Cookie::new(SESSION_COOKIE, "stale-id"))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::NOT_FOUND);
	}

	#[actix_web::test]
	async fn reset_drops_the_session() {
		let app = service().await;
		let cookie = upload(&app).await;
		start(&app, &cookie, json!({ "mode": "continuous" })).await;

		let req = test::TestRequest::post()
			.uri("/api/reset")
			.cookie(cookie.clone())
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert!(resp.status().is_success());

		// The session is gone: questions fail, stats read all zeros
		let req = test::TestRequest::get()
			.uri("/api/get-question")
			.cookie(cookie.clone())
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::get()
			.uri("/api/quiz-stats")
			.cookie(cookie.clone())
			.to_request();
		let stats: Value = test::read_body_json(test::call_service(&app, req).await).await;
		assert_eq!(stats["answered_count"], json!(0));
		assert_eq!(stats["correct_count"], json!(0));
	}

	#[actix_web::test]
	async fn submit_without_question_id_is_rejected() {
		let app = service().await;
		let cookie = upload(&app).await;
		start(&app, &cookie, json!({ "mode": "continuous" })).await;

		let req = test::TestRequest::post()
			.uri("/api/submit-answer")
			.cookie(cookie.clone())
			.set_json(json!({ "answer": "cat" }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}
}
