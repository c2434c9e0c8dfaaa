use std::collections::BTreeMap;

use serde::Serialize;

/// Logical fields of a financial extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Date,
    Time,
    Sales,
    Payout,
    OrderId,
    StoreId,
    TransactionType,
    Commission,
    MarketingFees,
    ProcessingFee,
    CustomerDiscounts,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 11] = [
        CanonicalField::Date,
        CanonicalField::Time,
        CanonicalField::Sales,
        CanonicalField::Payout,
        CanonicalField::OrderId,
        CanonicalField::StoreId,
        CanonicalField::TransactionType,
        CanonicalField::Commission,
        CanonicalField::MarketingFees,
        CanonicalField::ProcessingFee,
        CanonicalField::CustomerDiscounts,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Sales => "sales",
            Self::Payout => "payout",
            Self::OrderId => "order_id",
            Self::StoreId => "store_id",
            Self::TransactionType => "transaction_type",
            Self::Commission => "commission",
            Self::MarketingFees => "marketing_fees",
            Self::ProcessingFee => "processing_fee",
            Self::CustomerDiscounts => "customer_discounts",
        }
    }

    pub const fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Date => &["Timestamp local date", "Date", "Timestamp", "Order date"],
            Self::Time => &["Timestamp local time", "Order received local time", "Time"],
            Self::Sales => &["Subtotal", "Sales"],
            Self::Payout => &[
                "Net total",
                "Net total (for historical reference only)",
                "Net payout",
                "Payout",
            ],
            Self::OrderId => &["DoorDash order ID", "Order ID"],
            Self::StoreId => &["Merchant store ID", "Store ID"],
            Self::TransactionType => &["Transaction type"],
            Self::Commission => &["Commission"],
            Self::MarketingFees => &[
                "Marketing fees | (including any applicable taxes)",
                "Marketing fees",
            ],
            Self::ProcessingFee => &["Payment processing fee", "Processing fee"],
            Self::CustomerDiscounts => &[
                "Customer discounts from marketing | (Funded by you)",
                "Customer discounts from marketing",
            ],
        }
    }
}

/// Deduction columns read into `FeeAmounts`; each is optional.
pub const FEE_FIELDS: [CanonicalField; 4] = [
    CanonicalField::Commission,
    CanonicalField::MarketingFees,
    CanonicalField::ProcessingFee,
    CanonicalField::CustomerDiscounts,
];

/// Fields every table needs.
pub const CORE_FIELDS: [CanonicalField; 3] =
    [CanonicalField::Date, CanonicalField::Sales, CanonicalField::Payout];

const TIME_HEADER_FRAGMENT: &str = "local time";

/// Canonical field to column index, resolved once per loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedSchema {
    headers: Vec<String>,
    columns: BTreeMap<CanonicalField, usize>,
}

impl ResolvedSchema {
    pub fn resolve(headers: &[String]) -> Self {
        let normalized = headers
            .iter()
            .map(|header| normalize_header(header))
            .collect::<Vec<String>>();

        let mut columns = BTreeMap::new();
        for field in CanonicalField::ALL {
            let found = field.synonyms().iter().find_map(|synonym| {
                let wanted = normalize_header(synonym);
                normalized.iter().position(|header| *header == wanted)
            });
            let found = match (found, field) {
                (None, CanonicalField::Time) => normalized
                    .iter()
                    .position(|header| header.contains(TIME_HEADER_FRAGMENT)),
                (found, _) => found,
            };
            if let Some(index) = found {
                columns.insert(field, index);
            }
        }

        Self {
            headers: headers.iter().map(|header| header.trim().to_string()).collect(),
            columns,
        }
    }

    pub fn index(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn has(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn header(&self, field: CanonicalField) -> Option<&str> {
        self.index(field)
            .and_then(|index| self.headers.get(index))
            .map(String::as_str)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Names of the given fields that did not resolve.
    pub fn missing(&self, fields: &[CanonicalField]) -> Vec<&'static str> {
        fields
            .iter()
            .filter(|field| !self.has(**field))
            .map(|field| field.as_str())
            .collect()
    }

    pub fn value<'a>(&self, record: &'a csv::StringRecord, field: CanonicalField) -> Option<&'a str> {
        let value = record.get(self.index(field)?)?.trim();
        if value.is_empty() { None } else { Some(value) }
    }

    pub fn resolved_columns(&self) -> BTreeMap<&'static str, String> {
        self.columns
            .iter()
            .filter_map(|(field, index)| {
                self.headers
                    .get(*index)
                    .map(|header| (field.as_str(), header.clone()))
            })
            .collect()
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
}
