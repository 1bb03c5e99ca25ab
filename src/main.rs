#[actix_web::main]
async fn main() -> std::io::Result<()> {
    sheetdrop_lib::run().await
}
