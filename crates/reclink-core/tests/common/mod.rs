use reclink_core::model::RecordType;
use reclink_core::request_log::{LogLimits, RequestLog};
use reclink_core::store::{MemoryLine, MemoryRecord, MemoryRecordStore};
use serde_json::json;

/// Fresh request log with default caps
#[allow(dead_code)]
pub fn new_log() -> RequestLog {
    RequestLog::new(LogLimits::default())
}

/// Customer record with an email, an external id and no lines
#[allow(dead_code)]
pub fn customer(email: &str, external_id: &str) -> MemoryRecord {
    MemoryRecord::new()
        .field("email", json!(email))
        .field("externalid", json!(external_id))
}

/// Customer with two address book lines; the second has no city
#[allow(dead_code)]
pub fn customer_with_addresses() -> MemoryRecord {
    customer("ada@example.com", "EXT-42")
        .line(
            "addressbook",
            MemoryLine::new()
                .value("id", json!(301))
                .value("city", json!("London"))
                .subrecord(
                    "addressbookaddress",
                    MemoryRecord::new()
                        .field("addr1", json!("12 Marylebone Rd"))
                        .field("zip", json!("NW1 5LR")),
                ),
        )
        .line(
            "addressbook",
            MemoryLine::new()
                .value("id", json!(302))
                .value("label", json!("Warehouse")),
        )
}

/// Invoice for `customer` with `lines` item lines
#[allow(dead_code)]
pub fn invoice(customer: i64, tran_id: &str, lines: usize) -> MemoryRecord {
    let mut record = MemoryRecord::new()
        .field("entity", json!(customer))
        .field("tranid", json!(tran_id))
        .field("total", json!(100.0 * lines as f64));
    for i in 0..lines {
        record = record.line(
            "item",
            MemoryLine::new()
                .value("id", json!(i as i64 + 1))
                .value("item", json!(500 + i as i64))
                .value("amount", json!(100.0)),
        );
    }
    record
}

/// Store with three customers (two sharing an email) and their invoices
#[allow(dead_code)]
pub fn seeded_store() -> MemoryRecordStore {
    MemoryRecordStore::new()
        .with_record(RecordType::Customer, 40, customer("shared@x.io", "EXT-40"))
        .with_record(RecordType::Customer, 41, customer("shared@x.io", "EXT-41"))
        .with_record(RecordType::Customer, 42, customer_with_addresses())
        .with_record(RecordType::Invoice, 7, invoice(42, "INV-7", 3))
        .with_record(RecordType::Invoice, 9, invoice(42, "INV-9", 1))
        .with_record(RecordType::Invoice, 11, invoice(40, "INV-11", 2))
}
