use anyhow::{anyhow, Context, Result};
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;

use crate::backend::InstructionBackend;
use crate::catalog::{resolve_dependent_options, Catalog, OptionDescriptor};
use crate::form_state::FormSession;
use crate::form_values::FormValues;
use crate::main_ui_html::build_main_ui_html;
use crate::markdown::render_markdown;

pub struct AppState {
    pub session: Mutex<FormSession>,
    pub catalog: Arc<Catalog>,
    pub backend: Arc<dyn InstructionBackend + Send + Sync>,
    pub server_port: AtomicU16,
}

type ApiResponse = (StatusCode, Json<Value>);

impl AppState {
    pub fn new(
        session: FormSession,
        catalog: Arc<Catalog>,
        backend: Arc<dyn InstructionBackend + Send + Sync>,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            catalog,
            backend,
            server_port: AtomicU16::new(0),
        }
    }
}

pub struct AppServer {
    port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl AppServer {
    pub fn start(state: Arc<AppState>, preferred_port: u16) -> Result<Self> {
        let listener = bind_listener(preferred_port)?;
        let port = listener
            .local_addr()
            .context("failed to inspect server local address")?
            .port();
        listener
            .set_nonblocking(true)
            .context("failed to set listener non-blocking")?;

        state.server_port.store(port, Ordering::Relaxed);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let thread_handle = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();
            let Ok(runtime) = runtime else {
                return;
            };

            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(listener) => listener,
                    Err(_) => return,
                };

                let app = build_router(state);
                let server = axum::serve(listener, app).with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });

        Ok(Self {
            port,
            shutdown_tx: Some(shutdown_tx),
            thread_handle: Some(thread_handle),
        })
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for AppServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything the page needs to render one state of the form: the current
/// values, the cascade-resolved dependent option lists, inline validation
/// errors, and the rendered result pane.
#[derive(Debug, Clone, Serialize)]
struct UiSnapshot {
    values: FormValues,
    errors: Value,
    source_folder_options: Vec<OptionDescriptor>,
    diagram_category_options: Vec<OptionDescriptor>,
    diagram_options: Vec<OptionDescriptor>,
    llm_vendor_options: Vec<OptionDescriptor>,
    model_options: Vec<OptionDescriptor>,
    instructions_html: String,
    full_text: String,
}

#[derive(Debug, Deserialize)]
struct FieldChangeReq {
    field: String,
    value: Value,
}

fn build_router(state: Arc<AppState>) -> Router {
    let port = state.server_port.load(Ordering::Relaxed);
    let local_origin = HeaderValue::from_str(&format!("http://127.0.0.1:{port}"))
        .expect("127.0.0.1 origin should be valid");
    let localhost_origin = HeaderValue::from_str(&format!("http://localhost:{port}"))
        .expect("localhost origin should be valid");

    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("null"),
            local_origin,
            localhost_origin,
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(get_main_page))
        .route("/ping", get(get_ping))
        .route("/app/init", get(get_app_init))
        .route("/app/field-change", post(post_app_field_change))
        .route("/app/reset", post(post_app_reset))
        .route("/app/prepare", post(post_app_prepare))
        .layer(cors)
        .with_state(state)
}

async fn get_main_page() -> Html<String> {
    Html(build_main_ui_html())
}

async fn get_ping() -> ApiResponse {
    ok_json(json!({}))
}

/// Hydrated snapshot. The page blocks behind a loading indicator until this
/// returns, so stored values never flash in after defaults.
async fn get_app_init(State(state): State<Arc<AppState>>) -> ApiResponse {
    let snapshot = {
        let session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };
        build_ui_snapshot(session.values(), &state.catalog)
    };

    ok_snapshot(snapshot)
}

async fn post_app_field_change(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FieldChangeReq>,
) -> ApiResponse {
    let field = payload.field.trim().to_string();
    if field.is_empty() {
        return err_json(StatusCode::BAD_REQUEST, "field is required");
    }

    let snapshot = {
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };

        if let Err(err) = session.change_field(&field, &payload.value, &state.catalog) {
            let message = err.to_string();
            let status = if message.starts_with("unknown field") || message.contains("expects") {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            return err_json(status, &message);
        }

        build_ui_snapshot(session.values(), &state.catalog)
    };

    ok_snapshot(snapshot)
}

async fn post_app_reset(State(state): State<Arc<AppState>>) -> ApiResponse {
    let snapshot = {
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };

        if let Err(err) = session.reset(&state.catalog) {
            return err_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("save error: {err}"),
            );
        }

        build_ui_snapshot(session.values(), &state.catalog)
    };

    ok_snapshot(snapshot)
}

/// "Prepare Design Instructions". The session lock is released while the
/// backend call runs, so a second click races this one freely and whichever
/// response lands last wins. A backend failure is logged and otherwise
/// leaves the form exactly as it was.
async fn post_app_prepare(State(state): State<Arc<AppState>>) -> ApiResponse {
    let values = {
        let session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };
        session.values().clone()
    };

    let backend = state.backend.clone();
    let result = tokio::task::spawn_blocking(move || backend.generate(&values)).await;

    let payload = match result {
        Ok(Ok(payload)) => Some(payload),
        Ok(Err(err)) => {
            tracing::error!(%err, "instruction request failed");
            None
        }
        Err(err) => {
            tracing::error!(%err, "instruction task panicked");
            None
        }
    };

    let snapshot = {
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };

        if let Some(payload) = payload {
            if let Err(err) = session.set_design_instructions(payload) {
                return err_json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("save error: {err}"),
                );
            }
        }

        build_ui_snapshot(session.values(), &state.catalog)
    };

    ok_snapshot(snapshot)
}

fn ok_json(payload: Value) -> ApiResponse {
    let mut body = serde_json::Map::new();
    body.insert("ok".to_string(), Value::Bool(true));

    if let Some(obj) = payload.as_object() {
        for (key, value) in obj {
            body.insert(key.clone(), value.clone());
        }
    } else if !payload.is_null() {
        body.insert("data".to_string(), payload);
    }

    (StatusCode::OK, Json(Value::Object(body)))
}

fn ok_snapshot(snapshot: UiSnapshot) -> ApiResponse {
    match serde_json::to_value(&snapshot) {
        Ok(Value::Object(mut body)) => {
            body.insert("ok".to_string(), Value::Bool(true));
            (StatusCode::OK, Json(Value::Object(body)))
        }
        _ => err_json(StatusCode::INTERNAL_SERVER_ERROR, "snapshot encode error"),
    }
}

fn err_json(status: StatusCode, message: &str) -> ApiResponse {
    (
        status,
        Json(json!({
            "ok": false,
            "error": message,
        })),
    )
}

fn build_ui_snapshot(values: &FormValues, catalog: &Catalog) -> UiSnapshot {
    let diagram_options =
        resolve_dependent_options(&values.diagram_category, &catalog.diagram_categories).to_vec();
    let model_options =
        resolve_dependent_options(&values.llm_vendor_for_instructions, &catalog.llm_vendors)
            .to_vec();

    let errors = values
        .validate(catalog)
        .into_iter()
        .map(|(field, message)| (field.to_string(), Value::String(message)))
        .collect();

    UiSnapshot {
        errors: Value::Object(errors),
        source_folder_options: catalog.source_folder_options.clone(),
        diagram_category_options: catalog.diagram_category_options.clone(),
        diagram_options,
        llm_vendor_options: catalog.llm_vendor_options.clone(),
        model_options,
        instructions_html: render_markdown(&values.design_instructions),
        full_text: values.design_instructions.clone(),
        values: values.clone(),
    }
}

fn bind_listener(preferred_port: u16) -> Result<TcpListener> {
    for offset in 0..200u16 {
        let port = preferred_port.saturating_add(offset);
        if port == 0 {
            continue;
        }

        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            return Ok(listener);
        }
    }

    Err(anyhow!("failed to bind server port"))
}
