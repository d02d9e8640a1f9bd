use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wire string that is not a member of a closed enumeration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}")]
pub struct NotValid {
    pub kind: &'static str,
    pub value: String,
}

/// Category of remote record
///
/// The set is closed: record types arrive as free-form strings on the wire
/// and are validated with [`RecordType::parse`] before any lookup runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    // Entities
    Customer,
    Vendor,
    Employee,
    Contact,
    Partner,
    Lead,
    Prospect,

    // Transactions
    Invoice,
    SalesOrder,
    PurchaseOrder,
    Estimate,
    CreditMemo,
    CustomerPayment,
    CashSale,
    ItemFulfillment,
    ItemReceipt,
    ReturnAuthorization,
    VendorBill,
    JournalEntry,

    // Items
    InventoryItem,
    NonInventoryItem,
    ServiceItem,
    AssemblyItem,
    KitItem,

    // Lists
    Location,
    Subsidiary,
    Department,
    Classification,
    Account,

    // Activities and support
    Task,
    PhoneCall,
    SupportCase,
}

impl RecordType {
    /// Every record type, in declaration order
    pub const ALL: [RecordType; 32] = [
        RecordType::Customer,
        RecordType::Vendor,
        RecordType::Employee,
        RecordType::Contact,
        RecordType::Partner,
        RecordType::Lead,
        RecordType::Prospect,
        RecordType::Invoice,
        RecordType::SalesOrder,
        RecordType::PurchaseOrder,
        RecordType::Estimate,
        RecordType::CreditMemo,
        RecordType::CustomerPayment,
        RecordType::CashSale,
        RecordType::ItemFulfillment,
        RecordType::ItemReceipt,
        RecordType::ReturnAuthorization,
        RecordType::VendorBill,
        RecordType::JournalEntry,
        RecordType::InventoryItem,
        RecordType::NonInventoryItem,
        RecordType::ServiceItem,
        RecordType::AssemblyItem,
        RecordType::KitItem,
        RecordType::Location,
        RecordType::Subsidiary,
        RecordType::Department,
        RecordType::Classification,
        RecordType::Account,
        RecordType::Task,
        RecordType::PhoneCall,
        RecordType::SupportCase,
    ];

    /// The wire id of this record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Customer => "customer",
            RecordType::Vendor => "vendor",
            RecordType::Employee => "employee",
            RecordType::Contact => "contact",
            RecordType::Partner => "partner",
            RecordType::Lead => "lead",
            RecordType::Prospect => "prospect",
            RecordType::Invoice => "invoice",
            RecordType::SalesOrder => "salesorder",
            RecordType::PurchaseOrder => "purchaseorder",
            RecordType::Estimate => "estimate",
            RecordType::CreditMemo => "creditmemo",
            RecordType::CustomerPayment => "customerpayment",
            RecordType::CashSale => "cashsale",
            RecordType::ItemFulfillment => "itemfulfillment",
            RecordType::ItemReceipt => "itemreceipt",
            RecordType::ReturnAuthorization => "returnauthorization",
            RecordType::VendorBill => "vendorbill",
            RecordType::JournalEntry => "journalentry",
            RecordType::InventoryItem => "inventoryitem",
            RecordType::NonInventoryItem => "noninventoryitem",
            RecordType::ServiceItem => "serviceitem",
            RecordType::AssemblyItem => "assemblyitem",
            RecordType::KitItem => "kititem",
            RecordType::Location => "location",
            RecordType::Subsidiary => "subsidiary",
            RecordType::Department => "department",
            RecordType::Classification => "classification",
            RecordType::Account => "account",
            RecordType::Task => "task",
            RecordType::PhoneCall => "phonecall",
            RecordType::SupportCase => "supportcase",
        }
    }

    /// Validate a wire string against the closed set (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns `NotValid` when the string names no known record type.
    pub fn parse(value: &str) -> Result<RecordType, NotValid> {
        let wanted = value.trim().to_ascii_lowercase();
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| NotValid {
                kind: "record type",
                value: value.to_string(),
            })
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = NotValid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(RecordType::parse("Customer"), Ok(RecordType::Customer));
        assert_eq!(RecordType::parse(" SALESORDER "), Ok(RecordType::SalesOrder));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = RecordType::parse("spaceship").unwrap_err();
        assert_eq!(err.kind, "record type");
        assert_eq!(err.value, "spaceship");
    }

    #[test]
    fn test_wire_ids_round_trip_through_serde() {
        for t in RecordType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(RecordType::parse(t.as_str()), Ok(t));
        }
    }
}
