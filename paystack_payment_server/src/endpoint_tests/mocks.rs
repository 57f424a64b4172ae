use std::sync::{Arc, Mutex};

use chrono::Utc;
use mockall::mock;
use paystack_payment_engine::{
    db_types::{
        EnrollmentNotice,
        GatewayCredentials,
        LedgerEntry,
        NewLedgerEntry,
        OrderLineItem,
        PaymentRequest,
        PaymentRequestType,
        ProvisioningEntry,
        SalesOrder,
        TransactionMetadata,
        TransactionStatus,
        TxReference,
        VerificationResult,
    },
    traits::{
        CatalogError,
        DocumentStore,
        DocumentStoreError,
        EnrollmentMailer,
        GatewayClient,
        GatewayError,
        LedgerError,
        MailerError,
        ProvisioningCatalog,
        ReconciliationBackend,
        ReconciliationLedger,
    },
    ReconciliationApi,
};
use pps_common::Secret;

mock! {
    pub Gateway {}
    impl GatewayClient for Gateway {
        async fn verify(&self, reference: &TxReference, credentials: &GatewayCredentials) -> Result<VerificationResult, GatewayError>;
    }
}

mock! {
    pub Backend {}
    impl ReconciliationLedger for Backend {
        async fn record_if_absent(&self, entry: NewLedgerEntry) -> Result<(LedgerEntry, bool), LedgerError>;
        async fn fetch_entry_by_reference(&self, reference: &TxReference) -> Result<Option<LedgerEntry>, LedgerError>;
    }
    impl DocumentStore for Backend {
        async fn fetch_gateway_credentials(&self, gateway: &str) -> Result<Option<GatewayCredentials>, DocumentStoreError>;
        async fn fetch_payment_request(&self, name: &str) -> Result<Option<PaymentRequest>, DocumentStoreError>;
        async fn fetch_sales_order(&self, doctype: &str, name: &str) -> Result<Option<SalesOrder>, DocumentStoreError>;
        async fn settle_payment_request(&self, metadata: &TransactionMetadata) -> Result<(), DocumentStoreError>;
    }
    impl ProvisioningCatalog for Backend {
        async fn fetch_provisioning_entries(&self) -> Result<Vec<ProvisioningEntry>, CatalogError>;
    }
}

impl ReconciliationBackend for MockBackend {}

mock! {
    pub Mailer {}
    impl EnrollmentMailer for Mailer {
        async fn send_enrollment_notice(&self, notice: &EnrollmentNotice) -> Result<(), MailerError>;
    }
}

pub type MockApi = ReconciliationApi<MockGateway, MockBackend, MockMailer>;

pub fn credentials() -> GatewayCredentials {
    GatewayCredentials {
        gateway: "Paystack".to_string(),
        secret_key: Secret::new("sk_test_0000000000".to_string()),
        public_key: "pk_test_0000000000".to_string(),
    }
}

pub fn verification(status: TransactionStatus, reference: &str) -> VerificationResult {
    VerificationResult {
        reference: TxReference::from(reference.to_string()),
        status,
        amount: pps_common::Kobo::from(150_000),
        currency: "NGN".to_string(),
        message: "Verification successful".to_string(),
        transaction_id: 4_519_621,
        metadata: TransactionMetadata {
            gateway: Some("Paystack".to_string()),
            doctype: "Payment Request".to_string(),
            docname: "PR-0001".to_string(),
            reference_doctype: "Sales Order".to_string(),
            reference_name: "SO-0001".to_string(),
        },
        raw: serde_json::json!({"status": true}),
    }
}

pub fn ledger_entry_from(entry: &NewLedgerEntry) -> LedgerEntry {
    LedgerEntry {
        id: 1,
        amount: entry.amount,
        currency: entry.currency.clone(),
        message: entry.message.clone(),
        status: entry.status,
        reference: entry.reference.clone(),
        payment_request: entry.payment_request.clone(),
        reference_doctype: entry.reference_doctype.clone(),
        reference_name: entry.reference_name.clone(),
        transaction_id: entry.transaction_id,
        data: entry.data.clone(),
        created_at: Utc::now(),
    }
}

pub fn payment_request(request_type: PaymentRequestType) -> PaymentRequest {
    PaymentRequest {
        name: "PR-0001".to_string(),
        request_type,
        email_to: Some("buyer@example.com".to_string()),
        currency: "NGN".to_string(),
        status: "Requested".to_string(),
        payment_gateway: "Paystack".to_string(),
        reference_doctype: "Sales Order".to_string(),
        reference_name: "SO-0001".to_string(),
    }
}

pub fn sales_order() -> SalesOrder {
    SalesOrder {
        name: "SO-0001".to_string(),
        customer_name: "Ada Obi".to_string(),
        contact_email: Some("ada@example.com".to_string()),
        customer_email: None,
        items: vec![OrderLineItem { item_code: "COURSE-A".to_string() }],
    }
}

pub fn catalog() -> Vec<ProvisioningEntry> {
    vec![ProvisioningEntry {
        item_code: "COURSE-A".to_string(),
        enrollment_key: Some("KEY-A".to_string()),
        course_link: Some("https://lms.example.com/course-a".to_string()),
    }]
}

/// A mock API pre-wired for a full, successful first delivery. Every call along the flow appends to `log`, so tests
/// can compare the effect sequences of different entry points.
pub fn success_api(log: Arc<Mutex<Vec<String>>>) -> MockApi {
    let mut gateway = MockGateway::new();
    {
        let log = log.clone();
        gateway.expect_verify().times(1).returning(move |reference, _| {
            log.lock().unwrap().push(format!("verify:{reference}"));
            Ok(verification(TransactionStatus::Success, reference.as_str()))
        });
    }
    let mut backend = MockBackend::new();
    backend.expect_fetch_gateway_credentials().times(1).returning(|_| Ok(Some(credentials())));
    {
        let log = log.clone();
        backend.expect_record_if_absent().times(1).returning(move |entry| {
            log.lock().unwrap().push(format!("record:{}", entry.reference));
            Ok((ledger_entry_from(&entry), true))
        });
    }
    {
        let log = log.clone();
        backend.expect_settle_payment_request().times(1).returning(move |metadata| {
            log.lock().unwrap().push(format!("settle:{}", metadata.docname));
            Ok(())
        });
    }
    backend.expect_fetch_sales_order().times(1).returning(|_, _| Ok(Some(sales_order())));
    backend.expect_fetch_provisioning_entries().times(1).returning(|| Ok(catalog()));
    let mut mailer = MockMailer::new();
    {
        let log = log.clone();
        mailer.expect_send_enrollment_notice().times(1).returning(move |notice| {
            log.lock().unwrap().push(format!("mail:{}", notice.recipient));
            Ok(())
        });
    }
    ReconciliationApi::new(gateway, backend, mailer)
}
