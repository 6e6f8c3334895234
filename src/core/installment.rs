use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::dates::{format_iso_date, parse_iso_date_prefix};

/// Which stream an installment belongs to.
///
/// On the wire the backend uses `0` for principal and `1` for interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InstallmentKind {
    #[default]
    Principal,
    Interest,
}

impl InstallmentKind {
    pub fn code(self) -> u8 {
        match self {
            InstallmentKind::Principal => 0,
            InstallmentKind::Interest => 1,
        }
    }

    /// Label shown in tables
    pub fn label(self) -> &'static str {
        match self {
            InstallmentKind::Principal => "Principal",
            InstallmentKind::Interest => "Juros",
        }
    }
}

impl fmt::Display for InstallmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid installment kind {0}: expected 0 (principal) or 1 (interest)")]
pub struct InvalidKind(pub u8);

impl TryFrom<u8> for InstallmentKind {
    type Error = InvalidKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InstallmentKind::Principal),
            1 => Ok(InstallmentKind::Interest),
            other => Err(InvalidKind(other)),
        }
    }
}

impl From<InstallmentKind> for u8 {
    fn from(kind: InstallmentKind) -> Self {
        kind.code()
    }
}

/// Installment row sent to the calculation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    #[serde(rename = "tipo")]
    pub kind: InstallmentKind,
    #[serde(rename = "valorPrincipal", with = "rust_decimal::serde::float")]
    pub principal: Decimal,
    #[serde(rename = "vencimento", with = "iso_date")]
    pub due_date: NaiveDate,
    #[serde(rename = "liquidada")]
    pub settled: bool,
}

/// Installment row returned by the calculation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentResult {
    #[serde(rename = "tipo")]
    pub kind: InstallmentKind,
    #[serde(rename = "valorPrincipal", with = "rust_decimal::serde::float")]
    pub principal: Decimal,
    #[serde(rename = "valorJuros", with = "rust_decimal::serde::float")]
    pub interest: Decimal,
    #[serde(rename = "vencimento", with = "iso_date")]
    pub due_date: NaiveDate,
    #[serde(rename = "liquidada")]
    pub settled: bool,
}

/// Body of the post-fixed interest calculation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Fraction of the CDI rate, e.g. 0.149 for 14.9%
    #[serde(rename = "percentualCdi", with = "rust_decimal::serde::float")]
    pub cdi_rate: Decimal,
    #[serde(rename = "spreadAnual", with = "rust_decimal::serde::float")]
    pub annual_spread: Decimal,
    #[serde(rename = "dataInicial", with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(rename = "dataReferencia", with = "iso_date")]
    pub reference_date: NaiveDate,
    #[serde(rename = "parcelas")]
    pub installments: Vec<Installment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    #[serde(rename = "parcelas")]
    pub installments: Vec<InstallmentResult>,
}

/// ISO dates out; ISO dates with an optional time part in.
mod iso_date {
    use super::{format_iso_date, parse_iso_date_prefix};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso_date_prefix(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kind_uses_numeric_codes() {
        assert_eq!(serde_json::to_string(&InstallmentKind::Principal).unwrap(), "0");
        assert_eq!(serde_json::to_string(&InstallmentKind::Interest).unwrap(), "1");
        let kind: InstallmentKind = serde_json::from_str("1").unwrap();
        assert_eq!(kind, InstallmentKind::Interest);
        assert!(serde_json::from_str::<InstallmentKind>("2").is_err());
    }

    #[test]
    fn request_serializes_backend_field_names() {
        let request = CalculationRequest {
            cdi_rate: dec!(0.149),
            annual_spread: dec!(0.02),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            reference_date: NaiveDate::from_ymd_opt(2026, 4, 15).unwrap(),
            installments: vec![Installment {
                kind: InstallmentKind::Principal,
                principal: dec!(1000.50),
                due_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                settled: true,
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["percentualCdi"], serde_json::json!(0.149));
        assert_eq!(value["spreadAnual"], serde_json::json!(0.02));
        assert_eq!(value["dataInicial"], "2026-01-01");
        assert_eq!(value["dataReferencia"], "2026-04-15");
        let row = &value["parcelas"][0];
        assert_eq!(row["tipo"], 0);
        assert_eq!(row["valorPrincipal"], serde_json::json!(1000.5));
        assert_eq!(row["vencimento"], "2026-02-01");
        assert_eq!(row["liquidada"], true);
    }

    #[test]
    fn response_accepts_datetime_due_dates() {
        let body = r#"{
            "parcelas": [
                {"tipo": 1, "valorPrincipal": 0, "valorJuros": 123.45,
                 "vencimento": "2026-03-01T00:00:00", "liquidada": false},
                {"tipo": 0, "valorPrincipal": 1000, "valorJuros": 0,
                 "vencimento": "2026-03-01", "liquidada": true}
            ]
        }"#;

        let response: CalculationResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.installments.len(), 2);
        assert_eq!(response.installments[0].kind, InstallmentKind::Interest);
        assert_eq!(response.installments[0].interest, dec!(123.45));
        assert_eq!(
            response.installments[0].due_date,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert_eq!(response.installments[1].principal, dec!(1000));
        assert!(response.installments[1].settled);
    }
}
