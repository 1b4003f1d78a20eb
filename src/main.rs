use std::time::Duration;

use bankid_client::{
    client::{AuthenticateRequest, BankIdApi, BankIdClient},
    config::Config,
    messages::MessageCatalog,
    status::OrderStatus,
    telemetry,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    telemetry::init_tracing();

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Loaded configuration: {:?}", config);

    let catalog = MessageCatalog::new()?;
    let client = BankIdClient::new(&config)?;

    let language = std::env::var("BANKID_LANGUAGE").unwrap_or_else(|_| "en".to_string());
    let end_user_ip = std::env::var("BANKID_END_USER_IP").unwrap_or_else(|_| "127.0.0.1".to_string());
    let mut request = AuthenticateRequest::new(end_user_ip);
    if let Ok(personal_number) = std::env::var("BANKID_PERSONAL_NUMBER") {
        request = request.personal_number(personal_number);
    }

    let order = client.authenticate(request).await?;
    tracing::info!(order_ref = %order.order_ref, "authentication order started");
    println!("Start token: {}", order.auto_start_token);

    // The RP owns the polling cadence; the guidelines recommend every
    // two seconds.
    loop {
        tokio::time::sleep(Duration::from_secs(2)).await;
        let outcome = client.collect(&order.order_ref).await?;

        for id in outcome.message_ids() {
            println!("{id}: {}", catalog.get_user_message(*id, &language)?);
        }

        match outcome.status {
            OrderStatus::Pending => continue,
            OrderStatus::Complete => {
                if let Some(user) = outcome.completion_data.and_then(|data| data.user) {
                    println!("Completed by {} ({})", user.name, user.personal_number);
                }
                break;
            }
            OrderStatus::Failed => {
                tracing::warn!(hint = ?outcome.hint_code, "order failed");
                break;
            }
        }
    }

    Ok(())
}
