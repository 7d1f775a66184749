//! HTTP service: localized SPA shell, guestbook, gallery and admin API.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, CACHE_CONTROL, SET_COOKIE, VARY},
        HeaderMap, HeaderValue, Uri,
    },
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::{Database, GuestbookEntry, ModeratedEntry};
use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, PathParam};
use crate::gallery;
use crate::i18n::{
    parse_accept_language, CatalogValidator, CookiePreferenceStore, I18nMetrics, LocaleCode,
    LocaleResolver, MessageCatalog, PreferenceStore, Resolution, PREFERENCE_KEY,
};
use crate::router::{RouteMatch, RouteTable};
use crate::shell::{self, ShellText};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub catalog: Arc<MessageCatalog>,
    pub resolver: Arc<LocaleResolver>,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(config: Config, db: Database, catalog: MessageCatalog) -> Self {
        let resolver = LocaleResolver::from_registry(config.default_locale);
        Self {
            config: Arc::new(config),
            db,
            catalog: Arc::new(catalog),
            resolver: Arc::new(resolver),
            routes: Arc::new(RouteTable::spa()),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let locale_layer = middleware::from_fn_with_state(state.clone(), resolve_locale);

    // Paths without a route or a static file land on the SPA route table.
    let spa = Router::new()
        .fallback(spa_page)
        .layer(locale_layer.clone())
        .with_state(state.clone());

    let static_files = ServeDir::new(&state.config.static_dir)
        .append_index_html_on_directories(false)
        .call_fallback_on_method_not_allowed(true)
        .fallback(spa);

    Router::new()
        .route("/", get(spa_page))
        .route("/admin", get(admin_page))
        .route_layer(locale_layer)
        .route("/health", get(health))
        .route("/api/locales", get(list_locales))
        .route("/api/i18n/:locale", get(locale_messages))
        .route("/api/locale", post(set_locale))
        .route(
            "/api/guestbook",
            get(list_guestbook).post(add_guestbook_entry),
        )
        .route("/api/gallery", get(list_gallery))
        .route("/api/admin/login", post(admin_login))
        .route("/api/admin/guestbook", post(admin_list_guestbook))
        .route(
            "/api/admin/guestbook/:id/toggle",
            post(admin_toggle_entry),
        )
        .route(
            "/api/admin/upload",
            post(admin_upload).layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .nest_service("/photos", ServeDir::new(&state.config.photos_dir))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the database, load catalogs and serve until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("Failed to create data dir {}", config.data_dir.display()))?;

    let db = Database::connect(&config.database_url).await?;
    info!("✓ Database ready");

    let catalog = MessageCatalog::embedded().context("Failed to load message catalogs")?;
    log_catalog_report(&catalog);

    let addr = config.bind_address();
    let state = AppState::new(config, db, catalog);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("✓ Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn log_catalog_report(catalog: &MessageCatalog) {
    let report = CatalogValidator::validate(catalog);
    for problem in &report.errors {
        error!("Catalog: {}", problem);
    }
    for finding in &report.warnings {
        warn!("Catalog: {}", finding);
    }
    info!(
        "✓ Loaded message catalogs for {} locales",
        catalog.locales().count()
    );
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ==================== Locale Resolution ====================

fn browser_tags(headers: &HeaderMap) -> Option<Vec<String>> {
    headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(parse_accept_language)
}

/// Resolve the startup locale for page requests and stash it in the extensions.
async fn resolve_locale(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let store = CookiePreferenceStore::from_headers(request.headers());
    let tags = browser_tags(request.headers());
    let resolution = state.resolver.resolve_with(&store, tags.as_deref());

    request.extensions_mut().insert(resolution);
    next.run(request).await
}

// ==================== Pages ====================

async fn render_page(
    state: &AppState,
    resolution: Resolution,
    template_name: &str,
    title_key: &str,
    component: &str,
) -> AppResult<Response> {
    let locale = resolution.locale;
    let setup = state.catalog.setup(locale);
    let template_path = state.config.static_dir.join(template_name);

    let html = match tokio::fs::read_to_string(&template_path).await {
        Ok(template) => shell::inject(&template, &setup),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => shell::render_default(
            &setup,
            ShellText {
                title: state.catalog.translate(locale, title_key),
                description: state.catalog.translate(locale, "app.description"),
                component,
            },
        ),
        Err(e) => return Err(e.into()),
    }
    .context("Failed to serialize i18n setup")?;

    let mut response = Html(html).into_response();
    let headers = response.headers_mut();
    headers.insert(VARY, HeaderValue::from_static("Accept-Language, Cookie"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}

async fn spa_page(
    State(state): State<AppState>,
    Extension(resolution): Extension<Resolution>,
    uri: Uri,
) -> AppResult<Response> {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        return Err(AppError::NotFound);
    }

    match state.routes.resolve(path) {
        Some(RouteMatch::Render { component, .. }) => {
            render_page(&state, resolution, "index.html", "app.title", component).await
        }
        Some(RouteMatch::Redirect { to }) => Ok(Redirect::to(to).into_response()),
        None => Err(AppError::NotFound),
    }
}

async fn admin_page(
    State(state): State<AppState>,
    Extension(resolution): Extension<Resolution>,
) -> AppResult<Response> {
    render_page(&state, resolution, "admin.html", "admin.title", "AdminView").await
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "i18n": I18nMetrics::global().report(),
    }))
}

// ==================== Locale API ====================

async fn list_locales(State(state): State<AppState>) -> Json<Value> {
    let locales: Vec<Value> = state
        .resolver
        .supported()
        .iter()
        .map(|locale| {
            json!({
                "code": locale,
                "name": locale.name(),
                "nativeName": locale.native_name(),
            })
        })
        .collect();

    Json(json!({
        "locales": locales,
        "fallback": state.catalog.fallback_locale(),
        "default": state.resolver.default_locale(),
    }))
}

async fn locale_messages(
    State(state): State<AppState>,
    PathParam(code): PathParam<String>,
) -> AppResult<Json<Value>> {
    let locale = LocaleCode::from_code(&code).map_err(|_| AppError::NotFound)?;
    let messages = state
        .catalog
        .messages_for(locale)
        .ok_or(AppError::NotFound)?;

    Ok(Json(messages.clone()))
}

#[derive(Debug, Deserialize)]
struct LocaleChange {
    locale: String,
}

/// Persist an explicit locale choice.
async fn set_locale(headers: HeaderMap, JsonBody(change): JsonBody<LocaleChange>) -> AppResult<Response> {
    let locale = LocaleCode::from_code(&change.locale)
        .map_err(|_| AppError::UnsupportedLocale(change.locale.clone()))?;

    let mut store = CookiePreferenceStore::from_headers(&headers);
    store.set(PREFERENCE_KEY, locale.code());
    info!("Locale preference changed to {}", locale);

    let mut response = Json(json!({ "success": true, "locale": locale })).into_response();
    for cookie in store.set_cookie_headers() {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    Ok(response)
}

// ==================== Guestbook API ====================

async fn list_guestbook(State(state): State<AppState>) -> AppResult<Json<Vec<GuestbookEntry>>> {
    Ok(Json(state.db.list_visible().await?))
}

#[derive(Debug, Deserialize)]
struct NewEntry {
    name: Option<String>,
    content: Option<String>,
}

async fn add_guestbook_entry(
    State(state): State<AppState>,
    JsonBody(entry): JsonBody<NewEntry>,
) -> AppResult<Json<Value>> {
    let (Some(name), Some(content)) = (
        entry.name.filter(|name| !name.is_empty()),
        entry.content.filter(|content| !content.is_empty()),
    ) else {
        return Err(AppError::BadRequest("Missing name or content".to_string()));
    };

    let id = state.db.add_entry(&name, &content).await?;
    info!("New guestbook entry {}", id);

    Ok(Json(json!({ "success": true })))
}

// ==================== Gallery API ====================

async fn list_gallery(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(gallery::list_photos(&state.config.photos_dir).await?))
}

// ==================== Admin API ====================

#[derive(Debug, Default, Deserialize)]
struct AdminAuth {
    id: Option<String>,
    password: Option<String>,
}

impl AdminAuth {
    fn is_valid(&self, state: &AppState) -> bool {
        state
            .config
            .admin
            .verify(self.id.as_deref(), self.password.as_deref())
    }
}

async fn admin_login(
    State(state): State<AppState>,
    JsonBody(auth): JsonBody<AdminAuth>,
) -> AppResult<Json<Value>> {
    if !auth.is_valid(&state) {
        warn!("Rejected admin login");
        return Err(AppError::Unauthorized("Invalid credentials"));
    }
    Ok(Json(json!({ "success": true })))
}

async fn admin_list_guestbook(
    State(state): State<AppState>,
    JsonBody(auth): JsonBody<AdminAuth>,
) -> AppResult<Json<Vec<ModeratedEntry>>> {
    if !auth.is_valid(&state) {
        return Err(AppError::Unauthorized("Unauthorized"));
    }
    Ok(Json(state.db.list_all().await?))
}

/// Accepts `1`/`0` as well as `true`/`false`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VisibleState {
    Flag(bool),
    Number(i64),
}

impl VisibleState {
    fn as_int(&self) -> i64 {
        match self {
            VisibleState::Flag(flag) => i64::from(*flag),
            VisibleState::Number(n) => i64::from(*n != 0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    #[serde(flatten)]
    auth: AdminAuth,
    visible: Option<VisibleState>,
}

async fn admin_toggle_entry(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<ToggleRequest>,
) -> AppResult<Json<Value>> {
    if !request.auth.is_valid(&state) {
        return Err(AppError::Unauthorized("Unauthorized"));
    }
    let visible = request
        .visible
        .ok_or_else(|| AppError::BadRequest("Missing visible state".to_string()))?
        .as_int();

    if !state.db.set_visible(id, visible).await? {
        warn!("Visibility toggle for unknown guestbook entry {}", id);
    }
    Ok(Json(json!({ "success": true })))
}

/// Multipart upload form: `id`, `password` and `file`.
#[derive(Default)]
struct UploadForm {
    auth: AdminAuth,
    file: Option<(String, Vec<u8>)>,
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "id" => form.auth.id = Some(field.text().await?),
            "password" => form.auth.password = Some(field.text().await?),
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                form.file = Some((filename, data.to_vec()));
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn admin_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Value>> {
    let form = read_upload_form(multipart?).await?;

    if !form.auth.is_valid(&state) {
        return Err(AppError::Unauthorized("Unauthorized"));
    }
    let Some((filename, data)) = form.file else {
        return Err(AppError::BadRequest("No file part".to_string()));
    };
    if filename.is_empty() {
        return Err(AppError::BadRequest("No selected file".to_string()));
    }

    let stored = gallery::save_upload(&state.config.photos_dir, &filename, &data).await?;
    Ok(Json(json!({ "success": true, "filename": stored })))
}
