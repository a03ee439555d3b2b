use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Result};
use log::{error, info};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use time::OffsetDateTime;

use crate::auth::{
    AdminList, Authentication, AuthorizationGate, Credentials, IdentityResolver, RequestMode,
    StaticIdentityProvider,
};
use crate::config::Settings;
use crate::domain::{auctions, handle, AuctionId, AuthError, Command, CommandSuccess, Errors, HandleError, Repository};
use crate::persistence::json_file::{read_api_keys, read_commands, write_commands, PersistenceError};
use super::types::{
    AddAuctionRequest, ApiError, AppState, AuctionBid, AuctionDetail, AuctionItem, BidRequest, BidResponse,
    SessionResponse,
};

pub const API_KEY_HEADER: &str = "Api-Key";
pub const SESSION_COOKIE: &str = "session_token";
pub const FLASH_ERROR_HEADER: &str = "x-flash-error";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to load {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Failed to replay command log: {0}")]
    Replay(#[from] HandleError),
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error("Failed to record command: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Command log lock poisoned")]
    LogPoisoned,
}

/// Builds the shared state, replaying the command log if one is configured.
pub fn init_app_state(settings: &Settings) -> Result<AppState, StartupError> {
    let mut repository = Repository::new();
    let mut commands = Vec::new();
    if let Some(path) = settings.commands_file.as_ref().filter(|path| path.exists()) {
        commands = read_commands(path)?;
        for command in &commands {
            let (_, next) = handle(command.clone(), repository)?;
            repository = next;
        }
        info!("Replayed {} commands from {}", commands.len(), path.display());
    }

    let keys = match &settings.api_keys_file {
        Some(path) => read_api_keys(path)?,
        None => Default::default(),
    };

    Ok(AppState {
        repository: Arc::new(Mutex::new(repository)),
        commands: Arc::new(Mutex::new(commands)),
        provider: Arc::new(StaticIdentityProvider::new(keys)),
        admins: Arc::new(AdminList::new(settings.admin_external_ids.iter().cloned())),
        commands_file: settings.commands_file.clone(),
    })
}

pub fn request_mode(req: &HttpRequest) -> RequestMode {
    let accept = req
        .headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    RequestMode::from_accept(accept)
}

pub fn credentials(req: &HttpRequest) -> Credentials {
    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let session_token = req.cookie(SESSION_COOKIE).map(|cookie| cookie.value().to_string());
    Credentials { session_token, api_key }
}

fn lock(data: &AppState) -> Result<MutexGuard<'_, Repository>> {
    data.repository
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("repository lock poisoned"))
}

/// The gate reads users through the shared repository, locking per lookup, so
/// a slow identity provider never holds the repository lock.
fn gate(data: &AppState) -> AuthorizationGate<'_> {
    let resolver = IdentityResolver::new(&*data.repository, &*data.provider);
    AuthorizationGate::new(resolver, &*data.admins)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn error_response(mode: RequestMode, mut builder: actix_web::HttpResponseBuilder, message: String) -> HttpResponse {
    match mode {
        RequestMode::Programmatic => builder.json(ApiError { error: message }),
        RequestMode::Browser => HttpResponse::Found()
            .insert_header((header::LOCATION, "/"))
            .insert_header((FLASH_ERROR_HEADER, message))
            .finish(),
    }
}

fn auth_error(mode: RequestMode, err: AuthError) -> HttpResponse {
    match (mode, err) {
        (RequestMode::Browser, AuthError::UserNotFound) => redirect("/login"),
        _ => error_response(mode, HttpResponse::NotFound(), err.to_string()),
    }
}

fn handle_error(mode: RequestMode, err: ExecuteError) -> HttpResponse {
    match &err {
        ExecuteError::Handle(HandleError::BidRejected(rejection)) => {
            error_response(mode, HttpResponse::Forbidden(), rejection.to_string())
        }
        ExecuteError::Handle(HandleError::AuctionError(Errors::UnknownAuction(_)))
        | ExecuteError::Handle(HandleError::AuctionError(Errors::UnknownUser(_))) => {
            error_response(mode, HttpResponse::NotFound(), err.to_string())
        }
        ExecuteError::Handle(HandleError::AuctionError(_)) => {
            error_response(mode, HttpResponse::BadRequest(), err.to_string())
        }
        ExecuteError::Persistence(_) | ExecuteError::LogPoisoned => {
            error_response(mode, HttpResponse::InternalServerError(), err.to_string())
        }
    }
}

fn not_found(mode: RequestMode, auction_id: AuctionId) -> HttpResponse {
    error_response(mode, HttpResponse::NotFound(), Errors::UnknownAuction(auction_id).to_string())
}

/// Runs `command` against the locked repository. The command log is written
/// first; the new state is only swapped in once the command is on disk.
fn execute(data: &AppState, repository: &mut Repository, command: Command) -> Result<CommandSuccess, ExecuteError> {
    let (success, next) = handle(command.clone(), repository.clone())?;

    let mut commands = data.commands.lock().map_err(|_| ExecuteError::LogPoisoned)?;
    commands.push(command);
    if let Some(path) = &data.commands_file {
        if let Err(err) = write_commands(path, &commands) {
            commands.pop();
            error!("Failed to write command log {}: {}", path.display(), err);
            return Err(err.into());
        }
    }

    *repository = next;
    Ok(success)
}

fn bids_of<'a>(repository: &'a Repository, auction_id: AuctionId) -> &'a [crate::domain::Bid] {
    repository
        .auction(auction_id)
        .map(|(_, bids)| bids.as_slice())
        .unwrap_or(&[])
}

// Get all auctions
async fn get_auctions(data: web::Data<AppState>) -> Result<HttpResponse> {
    let repository = lock(&data)?;
    let now = OffsetDateTime::now_utc();
    let auction_list: Vec<AuctionItem> = auctions(&repository)
        .iter()
        .map(|auction| AuctionItem::new(auction, bids_of(&repository, auction.auction_id), now))
        .collect();

    Ok(HttpResponse::Ok().json(auction_list))
}

// Get auction by ID, showing the caller's own bids
async fn get_auction(req: HttpRequest, path: web::Path<AuctionId>, data: web::Data<AppState>) -> Result<HttpResponse> {
    let auction_id = path.into_inner();
    let mode = request_mode(&req);
    let viewer = gate(&data)
        .current_identity(mode, &credentials(&req))
        .map(|identity| identity.internal_id);

    let repository = lock(&data)?;
    match repository.auction(auction_id) {
        Some((auction, bids)) => {
            let detail = AuctionDetail {
                item: AuctionItem::new(auction, bids, OffsetDateTime::now_utc()),
                bids: bids.iter().map(|bid| AuctionBid::veiled(bid, viewer)).collect(),
            };
            Ok(HttpResponse::Ok().json(detail))
        }
        None => Ok(not_found(mode, auction_id)),
    }
}

async fn get_bids(req: HttpRequest, path: web::Path<AuctionId>, data: web::Data<AppState>) -> Result<HttpResponse> {
    let auction_id = path.into_inner();
    let mode = request_mode(&req);
    let viewer = gate(&data)
        .current_identity(mode, &credentials(&req))
        .map(|identity| identity.internal_id);

    let repository = lock(&data)?;
    match repository.auction(auction_id) {
        Some((_, bids)) => {
            let bids: Vec<AuctionBid> = bids.iter().map(|bid| AuctionBid::veiled(bid, viewer)).collect();
            Ok(HttpResponse::Ok().json(bids))
        }
        None => Ok(not_found(mode, auction_id)),
    }
}

// Place a bid on an auction. The body is only read once the caller is known.
async fn place_bid(
    req: HttpRequest,
    path: web::Path<AuctionId>,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> Result<HttpResponse> {
    let auction_id = path.into_inner();
    let mode = request_mode(&req);

    let identity = match gate(&data).require_authenticated(mode, &credentials(&req)) {
        Ok(Authentication::Identified(identity)) => identity,
        Ok(Authentication::MustRedirect) => return Ok(redirect("/login")),
        Err(err) => return Ok(auth_error(mode, err)),
    };

    let command = Command::PlaceBid {
        timestamp: OffsetDateTime::now_utc(),
        auction_id,
        bidder_id: identity.internal_id,
        amount: BidRequest::amount_from_body(req.content_type(), &body),
    };

    let mut repository = lock(&data)?;
    match execute(&data, &mut repository, command) {
        Ok(CommandSuccess::BidAccepted { bid, .. }) => match mode {
            RequestMode::Programmatic => Ok(HttpResponse::Ok().json(BidResponse { bid })),
            RequestMode::Browser => Ok(redirect(&format!("/auctions/{}", auction_id))),
        },
        Ok(other) => Ok(HttpResponse::Ok().json(other)),
        Err(err) => Ok(handle_error(mode, err)),
    }
}

/// Exchanges an API credential for a browser session.
async fn login(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse> {
    let mode = request_mode(&req);
    let identity = match gate(&data).require_credential(credentials(&req).api_key.as_deref()) {
        Ok(identity) => identity,
        Err(err) => return Ok(error_response(mode, HttpResponse::NotFound(), err.to_string())),
    };

    let token = match lock(&data)?.issue_session(identity.internal_id) {
        Ok(token) => token,
        Err(err) => return Ok(error_response(mode, HttpResponse::NotFound(), err.to_string())),
    };
    info!("Session started for user {}", identity.internal_id);

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    match mode {
        RequestMode::Programmatic => Ok(HttpResponse::Ok().cookie(cookie).json(SessionResponse { user: identity })),
        RequestMode::Browser => Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, "/"))
            .cookie(cookie)
            .finish()),
    }
}

async fn logout(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse> {
    if let Some(token) = credentials(&req).session_token {
        lock(&data)?.end_session(&token);
    }

    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/login"))
        .cookie(cookie)
        .finish())
}

async fn admin_auctions(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse> {
    let mode = request_mode(&req);
    if let Err(err) = gate(&data).require_admin(mode, &credentials(&req)) {
        return Ok(auth_error(mode, err));
    }

    let repository = lock(&data)?;
    let now = OffsetDateTime::now_utc();
    let details: Vec<AuctionDetail> = auctions(&repository)
        .iter()
        .map(|auction| {
            let bids = bids_of(&repository, auction.auction_id);
            AuctionDetail {
                item: AuctionItem::new(auction, bids, now),
                bids: bids.iter().map(AuctionBid::unveiled).collect(),
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(details))
}

// Create a new auction
async fn create_auction(req: HttpRequest, body: web::Bytes, data: web::Data<AppState>) -> Result<HttpResponse> {
    let mode = request_mode(&req);
    if let Err(err) = gate(&data).require_admin(mode, &credentials(&req)) {
        return Ok(auth_error(mode, err));
    }

    let auction_req: AddAuctionRequest = match serde_json::from_slice(&body) {
        Ok(auction_req) => auction_req,
        Err(err) => return Ok(error_response(mode, HttpResponse::BadRequest(), format!("Invalid auction: {}", err))),
    };
    let command = Command::AddAuction {
        timestamp: OffsetDateTime::now_utc(),
        auction: auction_req.to_auction(),
    };

    let mut repository = lock(&data)?;
    match execute(&data, &mut repository, command) {
        Ok(success) => Ok(HttpResponse::Ok().json(success)),
        Err(err) => Ok(handle_error(mode, err)),
    }
}

// Configure routes
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/auctions", web::get().to(get_auctions))
            .route("/auctions/{id}", web::get().to(get_auction))
            .route("/auctions/{id}/bids", web::get().to(get_bids))
            .route("/auctions/{id}/bids", web::post().to(place_bid))
            .route("/admin/auctions", web::get().to(admin_auctions))
            .route("/admin/auctions", web::post().to(create_auction)),
    );
}
