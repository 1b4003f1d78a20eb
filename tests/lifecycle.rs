//! Drives the resolve-and-render pipeline through a scripted transport
//! stub, the way an embedding application consumes the crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bankid_client::client::{
    AuthenticateRequest, BankIdApi, ClientError, CollectResponse, OrderResponse, SignRequest,
};
use bankid_client::messages::MessageCatalog;
use bankid_client::status::{HintCode, OrderStatus};

const ORDER_REF: &str = "131daac9-16c6-4618-beb0-365768f37288";

struct ScriptedApi {
    collects: Mutex<VecDeque<CollectResponse>>,
}

impl ScriptedApi {
    fn new(collects: Vec<CollectResponse>) -> Self {
        Self {
            collects: Mutex::new(collects.into()),
        }
    }
}

fn collect_response(status: OrderStatus, hint: Option<&str>) -> CollectResponse {
    CollectResponse {
        order_ref: ORDER_REF.to_string(),
        status,
        hint_code: hint.map(HintCode::from),
        completion_data: None,
    }
}

#[async_trait]
impl BankIdApi for ScriptedApi {
    async fn authenticate(
        &self,
        _request: AuthenticateRequest,
    ) -> Result<OrderResponse, ClientError> {
        Ok(OrderResponse {
            order_ref: ORDER_REF.to_string(),
            auto_start_token: "7c40b5c9-fa74-49cf-b98c-bfe651f9a7c6".to_string(),
            qr_start_token: None,
            qr_start_secret: None,
        })
    }

    async fn sign(&self, _request: SignRequest) -> Result<OrderResponse, ClientError> {
        Ok(OrderResponse {
            order_ref: ORDER_REF.to_string(),
            auto_start_token: "7c40b5c9-fa74-49cf-b98c-bfe651f9a7c6".to_string(),
            qr_start_token: None,
            qr_start_secret: None,
        })
    }

    async fn collect(&self, order_ref: &str) -> Result<CollectResponse, ClientError> {
        assert_eq!(order_ref, ORDER_REF, "collect must reuse the orderRef");
        let mut script = self.collects.lock().unwrap();
        Ok(script.pop_front().expect("collect called past the script"))
    }

    async fn cancel(&self, order_ref: &str) -> Result<(), ClientError> {
        assert_eq!(order_ref, ORDER_REF);
        Ok(())
    }
}

async fn poll_to_terminal(
    api: &dyn BankIdApi,
    catalog: &MessageCatalog,
    order_ref: &str,
) -> (CollectResponse, Vec<String>) {
    let mut shown = Vec::new();
    loop {
        let outcome = api.collect(order_ref).await.unwrap();
        for id in outcome.message_ids() {
            shown.push(catalog.get_user_message(*id, "en").unwrap());
        }
        if outcome.is_terminal() {
            return (outcome, shown);
        }
    }
}

#[tokio::test]
async fn authentication_polls_to_completion() {
    let api = ScriptedApi::new(vec![
        collect_response(OrderStatus::Pending, Some("outstandingTransaction")),
        collect_response(OrderStatus::Pending, Some("userSign")),
        collect_response(OrderStatus::Complete, None),
    ]);
    let catalog = MessageCatalog::new().unwrap();

    let order = api
        .authenticate(AuthenticateRequest::new("194.168.2.25"))
        .await
        .unwrap();
    let (outcome, shown) = poll_to_terminal(&api, &catalog, &order.order_ref).await;

    assert_eq!(outcome.status, OrderStatus::Complete);
    assert_eq!(
        shown,
        vec![
            // outstandingTransaction offers two candidates; both render.
            "Trying to start your BankID app.",
            "Start your BankID app.",
            "Enter your security code in the BankID app and select Identify or Sign.",
        ]
    );
}

#[tokio::test]
async fn user_cancellation_renders_rfa6() {
    let api = ScriptedApi::new(vec![collect_response(
        OrderStatus::Failed,
        Some("userCancel"),
    )]);
    let catalog = MessageCatalog::new().unwrap();

    let (outcome, shown) = poll_to_terminal(&api, &catalog, ORDER_REF).await;

    assert_eq!(outcome.status, OrderStatus::Failed);
    assert_eq!(shown, vec!["Action cancelled."]);
}

#[tokio::test]
async fn unknown_failure_renders_the_fallback_message() {
    let api = ScriptedApi::new(vec![
        collect_response(OrderStatus::Pending, Some("hintFromTheFuture")),
        collect_response(OrderStatus::Failed, Some("hintFromTheFuture")),
    ]);
    let catalog = MessageCatalog::new().unwrap();

    let (outcome, shown) = poll_to_terminal(&api, &catalog, ORDER_REF).await;

    assert_eq!(outcome.status, OrderStatus::Failed);
    assert_eq!(
        shown,
        vec![
            "Identification or signing in progress.",
            "Unknown error. Please try again.",
        ]
    );
}

#[tokio::test]
async fn custom_overrides_flow_through_to_rendering() {
    let api = ScriptedApi::new(vec![collect_response(
        OrderStatus::Failed,
        Some("expiredTransaction"),
    )]);
    let catalog = MessageCatalog::new().unwrap();
    let overridden = "Appen svarade inte i tid. Försök igen.";
    assert!(catalog.register_custom_message(
        bankid_client::messages::MessageId::Rfa8,
        "sv",
        overridden
    ));

    let outcome = api.collect(ORDER_REF).await.unwrap();
    let ids = outcome.message_ids();
    assert_eq!(ids.len(), 1);
    assert_eq!(catalog.get_user_message(ids[0], "SV").unwrap(), overridden);
    // English stays on the guideline default.
    assert!(
        catalog
            .get_user_message(ids[0], "en")
            .unwrap()
            .starts_with("The BankID app is not responding.")
    );
}

#[tokio::test]
async fn cancel_accepts_the_order_reference() {
    let api = ScriptedApi::new(vec![]);
    assert!(api.cancel(ORDER_REF).await.is_ok());
}
