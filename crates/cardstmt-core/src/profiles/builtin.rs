//! Built-in issuer profiles.
//!
//! Registration order is detection priority. The signatures below are
//! mutually exclusive for real statements, so the order only matters for
//! documents that mention several issuers (e.g. a balance transfer notice).

use super::{ProfileSpec, SignatureSpec};
use crate::statement::ledger::{GrammarSpec, SignPolicy};
use crate::statement::rules::DateOrder;

/// Masked card number: `XXXX XXXX XXXX 1234`, `****-****-****-1234`.
const MASKED_CARD: &str = r"(?:[X*]{4}[\s-]?){3}(\d{4})\b";

/// `Card Number: XXXXXXXXXXXX1234`, `Card No. **** 1234`.
const LABELLED_CARD: &str = r"Card\s+(?:Number|No\.?)\s*:?\s*(?:[X*]+[\s-]?)*(\d{4})\b";

const PAYMENT_DUE_DATE: &str = r"Payment\s+Due\s+(?:Date|By)\s*:?\s*({date})";
const DUE_DATE: &str = r"Due\s+Date\s*:?\s*({date})";
const TOTAL_AMOUNT_DUE: &str = r"Total\s+Amount\s+Due\s*:?\s*{currency}\s*({amount})";
const STATEMENT_PERIOD: &str = r"Statement\s+Period\s*:?\s*({date})\s+(?:to|-|till)\s+({date})";
const FROM_TO: &str = r"From\s+({date})\s+to\s+({date})";

/// Built-in profile specs in detection order.
pub fn builtin_specs() -> Vec<ProfileSpec> {
    vec![hdfc(), icici(), sbi_card(), axis(), kotak()]
}

fn list(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

fn signature(all_of: &[&str], any_of: &[&str]) -> SignatureSpec {
    SignatureSpec {
        all_of: list(all_of),
        any_of: list(any_of),
    }
}

fn hdfc() -> ProfileSpec {
    ProfileSpec {
        name: "HDFC Bank".to_string(),
        signature: signature(&["hdfc"], &[]),
        card_last4: list(&[
            MASKED_CARD,
            LABELLED_CARD,
            r"Card\s+ending\s+(?:with|in)?\s*:?\s*(\d{4})\b",
            r"\b(\d{4})[ \t]+HDFC",
        ]),
        billing_cycle: list(&[
            r"Statement\s+(?:Period|Date|from)\s*:?\s*({date})\s+(?:to|-|till)\s+({date})",
            r"Billing\s+Cycle\s*:?\s*({date})\s+(?:to|-|till)\s+({date})",
            FROM_TO,
        ]),
        payment_due_date: list(&[PAYMENT_DUE_DATE, DUE_DATE, r"Pay\s+By\s*:?\s*({date})"]),
        total_amount_due: list(&[
            TOTAL_AMOUNT_DUE,
            r"Amount\s+Due\s*:?\s*{currency}\s*({amount})",
            r"New\s+Balance\s*:?\s*{currency}\s*({amount})",
            r"Current\s+Outstanding\s*:?\s*{currency}\s*({amount})",
        ]),
        date_order: DateOrder::DayFirst,
        sign_policy: SignPolicy::CreditNegative,
        ledger: GrammarSpec::Pattern {
            pattern: r"^\s*(?P<date>{date})\s+(?P<description>.+?)\s+{currency}\s*(?P<amount>{amount})(?:\s*(?P<marker>Cr|Dr))?\s*$"
                .to_string(),
            row_start: None,
        },
    }
}

fn icici() -> ProfileSpec {
    ProfileSpec {
        name: "ICICI Bank".to_string(),
        signature: signature(&["icici"], &[]),
        card_last4: list(&[
            MASKED_CARD,
            LABELLED_CARD,
            r"\b(\d{4})\s*ICICI",
            r"ending\s+(?:with|in)\s+(\d{4})\b",
        ]),
        billing_cycle: list(&[STATEMENT_PERIOD, FROM_TO]),
        payment_due_date: list(&[PAYMENT_DUE_DATE, DUE_DATE]),
        total_amount_due: list(&[
            TOTAL_AMOUNT_DUE,
            r"Amount\s+Payable\s*:?\s*{currency}\s*({amount})",
        ]),
        date_order: DateOrder::DayFirst,
        sign_policy: SignPolicy::CreditNegative,
        // Date, optional reference number, details, optional reward points, amount, CR/DR
        ledger: GrammarSpec::Pattern {
            pattern: r"^\s*(?P<date>{date})\s+(?:\d{6,}\s+)?(?P<description>.+?)\s+(?:-?\d+\s+)?{currency}\s*(?P<amount>{amount})(?:\s*(?P<marker>CR|DR))?\s*$"
                .to_string(),
            row_start: None,
        },
    }
}

fn sbi_card() -> ProfileSpec {
    ProfileSpec {
        name: "SBI Card".to_string(),
        signature: signature(&[], &["sbi card", "sbi credit", "sbicard"]),
        card_last4: list(&[MASKED_CARD, LABELLED_CARD]),
        billing_cycle: list(&[
            r"(?:for\s+)?Statement\s+Period\s*:?\s*({date})\s+(?:to|-|till)\s+({date})",
            FROM_TO,
        ]),
        payment_due_date: list(&[PAYMENT_DUE_DATE, DUE_DATE]),
        total_amount_due: list(&[TOTAL_AMOUNT_DUE]),
        date_order: DateOrder::DayFirst,
        sign_policy: SignPolicy::AllPositive,
        // 06 Jan 24 SWIGGY BANGALORE 450.00 D
        ledger: GrammarSpec::Pattern {
            pattern: r"^\s*(?P<date>{date})\s+(?P<description>.+?)\s+{currency}\s*(?P<amount>{amount})(?:\s+(?P<marker>[CD]))?\s*$"
                .to_string(),
            row_start: None,
        },
    }
}

fn axis() -> ProfileSpec {
    ProfileSpec {
        name: "Axis Bank".to_string(),
        signature: signature(&["axis bank"], &[]),
        card_last4: list(&[MASKED_CARD, LABELLED_CARD, r"\b(\d{4})\s*Axis"]),
        billing_cycle: list(&[STATEMENT_PERIOD, FROM_TO]),
        payment_due_date: list(&[PAYMENT_DUE_DATE, DUE_DATE]),
        total_amount_due: list(&[
            TOTAL_AMOUNT_DUE,
            r"Amount\s+Payable\s*:?\s*{currency}\s*({amount})",
        ]),
        date_order: DateOrder::DayFirst,
        sign_policy: SignPolicy::CreditNegative,
        ledger: GrammarSpec::Pattern {
            pattern: r"^\s*(?P<date>{date})\s+(?P<description>.+?)\s+{currency}\s*(?P<amount>{amount})(?:\s*(?P<marker>Dr|Cr))?\s*$"
                .to_string(),
            row_start: None,
        },
    }
}

fn kotak() -> ProfileSpec {
    ProfileSpec {
        name: "Kotak Mahindra Bank".to_string(),
        signature: signature(&["kotak"], &[]),
        card_last4: list(&[MASKED_CARD, LABELLED_CARD]),
        billing_cycle: list(&[
            STATEMENT_PERIOD,
            r"Billing\s+Period\s*:?\s*({date})\s+(?:to|-)\s+({date})",
        ]),
        payment_due_date: list(&[
            PAYMENT_DUE_DATE,
            r"Remember\s+to\s+Pay\s+By\s*:?\s*({date})",
            DUE_DATE,
        ]),
        total_amount_due: list(&[
            TOTAL_AMOUNT_DUE,
            r"Total\s+Dues\s*:?\s*{currency}\s*({amount})",
        ]),
        date_order: DateOrder::DayFirst,
        // Credits are printed in parentheses: (5,000.00)
        sign_policy: SignPolicy::AsPrinted,
        ledger: GrammarSpec::Pattern {
            pattern: r"^\s*(?P<date>{date})\s+(?P<description>.+?)\s+{currency}\s*(?P<amount>{amount})\s*$".to_string(),
            row_start: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::BankProfile;
    use crate::statement::ledger::{RowOutcome, extract_ledger};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn compiled(spec: ProfileSpec) -> BankProfile {
        spec.compile().unwrap()
    }

    fn amounts(profile: &BankProfile, text: &str) -> Vec<(String, Decimal)> {
        extract_ledger(text, profile.grammar(), profile.date_order(), profile.sign_policy())
            .transactions
            .into_iter()
            .map(|t| (t.description, t.amount))
            .collect()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_all_builtins_compile() {
        for spec in builtin_specs() {
            let profile = compiled(spec);
            assert!(profile.has_field_patterns(), "{} has no patterns", profile.name());
        }
    }

    #[test]
    fn test_hdfc_credit_marker_is_negative() {
        let profile = compiled(hdfc());
        let text = "06/01/2024 SWIGGY 450.00\n08/01/2024 PAYMENT RECEIVED 10,000.00 Cr";
        assert_eq!(
            amounts(&profile, text),
            vec![
                ("SWIGGY".to_string(), dec("450.00")),
                ("PAYMENT RECEIVED".to_string(), dec("-10000.00")),
            ]
        );
    }

    #[test]
    fn test_icici_skips_reference_and_reward_points() {
        let profile = compiled(icici());
        let text = "06/01/2024 98765432101 AMAZON PAY INDIA 12 1,299.00\n07/01/2024 REFUND FLIPKART 500.00 CR";
        assert_eq!(
            amounts(&profile, text),
            vec![
                ("AMAZON PAY INDIA".to_string(), dec("1299.00")),
                ("REFUND FLIPKART".to_string(), dec("-500.00")),
            ]
        );
    }

    #[test]
    fn test_sbi_absorbs_marker_into_description() {
        let profile = compiled(sbi_card());
        let text = "06 Jan 24 SWIGGY BANGALORE 450.00 D\n10 Jan 24 PAYMENT RECEIVED 5,000.00 C";
        assert_eq!(
            amounts(&profile, text),
            vec![
                ("SWIGGY BANGALORE D".to_string(), dec("450.00")),
                ("PAYMENT RECEIVED C".to_string(), dec("5000.00")),
            ]
        );
    }

    #[test]
    fn test_kotak_parenthesised_credit() {
        let profile = compiled(kotak());
        let line = "06-Jan-2024 PAYMENT RECEIVED (5,000.00)";
        match profile.grammar().parse_line(line, profile.date_order(), profile.sign_policy()) {
            RowOutcome::Parsed(txn) => assert_eq!(txn.amount, dec("-5000.00")),
            other => panic!("expected a parsed row, got {:?}", other),
        }
    }

    #[test]
    fn test_axis_debit_marker_is_positive() {
        let profile = compiled(axis());
        assert_eq!(
            amounts(&profile, "06/01/2024 UBER INDIA 210.50 Dr"),
            vec![("UBER INDIA".to_string(), dec("210.50"))]
        );
    }
}
