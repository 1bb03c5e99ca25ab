pub mod multipart;


use crate::application::UploadUseCase;
use crate::domain::error::AppError;
use crate::domain::spreadsheet::SpreadsheetRecord;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::storage::write_upload;
use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use multipart::{read_excel_upload, FILE_FIELD};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct HttpState {
    pub upload_use_case: Arc<UploadUseCase>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub result: SpreadsheetRecord,
}

#[get("/")]
async fn liveness() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Server is running!")
}

#[get("/upload/hello")]
async fn hello_world() -> impl Responder {
    HttpResponse::Ok().json(MessageResponse::new("Hello, World! Backend is working!"))
}

#[post("/upload")]
async fn upload_excel_file(data: web::Data<HttpState>, payload: Multipart) -> impl Responder {
    let upload = match read_excel_upload(payload, FILE_FIELD, data.max_upload_bytes).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return HttpResponse::BadRequest().json(MessageResponse::new("No file uploaded"));
        }
        Err(e) => {
            warn!(error = %e, "Upload rejected");
            return rejection_response(&e);
        }
    };

    info!(
        file_name = %upload.file_name,
        content_type = %upload.content_type,
        size = upload.bytes.len(),
        "Received upload"
    );

    let file_path = match write_upload(&data.upload_dir, &upload.file_name, &upload.bytes).await
    {
        Ok(path) => path,
        Err(e) => {
            error!(error = %e, "Error saving upload");
            return server_error();
        }
    };

    match data.upload_use_case.process_and_store(file_path).await {
        Ok(record) => HttpResponse::Ok().json(UploadResponse {
            message: "File processed successfully".to_string(),
            result: record,
        }),
        Err(e) => {
            error!(error = %e, "Error processing file");
            server_error()
        }
    }
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Not Found" }))
}

fn rejection_response(err: &AppError) -> HttpResponse {
    match err {
        AppError::UnsupportedMediaType(_) => HttpResponse::BadRequest().json(MessageResponse::new(
            "Invalid file type. Only Excel files are allowed.",
        )),
        AppError::PayloadTooLarge(_) => {
            HttpResponse::PayloadTooLarge().json(MessageResponse::new("File too large"))
        }
        AppError::ValidationError(msg) => HttpResponse::BadRequest().json(MessageResponse {
            message: msg.clone(),
        }),
        _ => server_error(),
    }
}

fn server_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(MessageResponse::new("Server error"))
}

pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_header(header::CONTENT_TYPE)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(
        web::scope("/api")
            .service(upload_excel_file)
            .service(hello_world),
    );
}

pub fn start_server(state: HttpState, config: &AppConfig) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
            .default_service(web::route().to(not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    info!(host = %config.host, port = config.port, "Server running");

    Ok(server)
}
