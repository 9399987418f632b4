// src/services/compute.rs
//
// Pure arithmetic core of the reconciliation engine. Everything here is
// plain data in, plain data out: the same functions run over live rows and
// over a period snapshot, which is what lets the carryover calculator switch
// sources without changing results.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;

use crate::models::{
    period::SnapshotBody,
    pricing::PriceRow,
    stock::Item,
};

/// One finalized closing for an item: counted leftover plus waste.
#[derive(Debug, Clone)]
pub struct ClosingLine {
    pub item_key: String,
    pub closing_qty: Decimal,
    pub waste_qty: Decimal,
}

/// Everything needed to compute one outlet-day, regardless of source.
#[derive(Debug, Clone, Default)]
pub struct DayInputs {
    /// Effective opening per item: prior day's live closing carryover plus
    /// the day's opening rows.
    pub opening_effective: HashMap<String, Decimal>,
    pub closings: Vec<ClosingLine>,
    /// Resolved sell price per item; a missing entry means zero.
    pub prices: HashMap<String, Decimal>,
    pub expenses_total: Decimal,
    pub verified_deposits: Decimal,
}

/// Non-blocking anomalies surfaced alongside the totals. These flag data
/// problems for the operator; the computation itself always succeeds.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputeWarning {
    /// Opening minus closing minus waste went negative, usually a late or
    /// duplicate supply edit. The sold quantity was clamped to zero.
    NegativeSoldClamped { item_key: String, raw: Decimal },
    /// An item sold at price zero, usually a missing pricebook entry.
    MissingPrice { item_key: String, sold_qty: Decimal },
}

impl fmt::Display for ComputeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeWarning::NegativeSoldClamped { item_key, raw } => write!(
                f,
                "sold quantity for '{item_key}' computed negative ({raw}); clamped to zero"
            ),
            ComputeWarning::MissingPrice { item_key, sold_qty } => write!(
                f,
                "item '{item_key}' sold {sold_qty} at price zero; pricebook entry likely missing"
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DayTotals {
    pub weight_sales: Decimal,
    pub expenses: Decimal,
    pub waste_value: Decimal,
    pub verified_deposits: Decimal,
    pub warnings: Vec<ComputeWarning>,
}

/// Derived sold quantity per item. Items with no closing recorded yet are
/// excluded: they have not been finalized.
pub fn sold_quantities(inputs: &DayInputs) -> (HashMap<String, Decimal>, Vec<ComputeWarning>) {
    let mut sold = HashMap::new();
    let mut warnings = Vec::new();

    for line in &inputs.closings {
        let opening = inputs
            .opening_effective
            .get(&line.item_key)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let raw = opening - line.closing_qty - line.waste_qty;
        let qty = if raw < Decimal::ZERO {
            warnings.push(ComputeWarning::NegativeSoldClamped {
                item_key: line.item_key.clone(),
                raw,
            });
            Decimal::ZERO
        } else {
            raw
        };
        sold.insert(line.item_key.clone(), qty);
    }

    (sold, warnings)
}

/// Combines sold quantities with resolved prices into the day's totals.
pub fn day_totals(inputs: &DayInputs) -> DayTotals {
    let (sold, mut warnings) = sold_quantities(inputs);

    let mut weight_sales = Decimal::ZERO;
    let mut waste_value = Decimal::ZERO;

    for line in &inputs.closings {
        let price = inputs
            .prices
            .get(&line.item_key)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let sold_qty = sold
            .get(&line.item_key)
            .copied()
            .unwrap_or(Decimal::ZERO);

        if price == Decimal::ZERO && sold_qty > Decimal::ZERO {
            warnings.push(ComputeWarning::MissingPrice {
                item_key: line.item_key.clone(),
                sold_qty,
            });
        }

        weight_sales += sold_qty * price;
        waste_value += line.waste_qty * price;
    }

    DayTotals {
        weight_sales,
        expenses: inputs.expenses_total,
        waste_value,
        verified_deposits: inputs.verified_deposits,
        warnings,
    }
}

/// Signed outstanding balance for a day: what the outlet still owes, or
/// (negative) what it over-deposited. Never clamped: a clamp here would
/// silently destroy money owed back to the outlet.
pub fn outstanding(totals: &DayTotals) -> Decimal {
    (totals.weight_sales - totals.expenses) - totals.verified_deposits
}

/// The header figure the attendant reconciles against at day end.
pub fn amount_to_deposit(
    carryover_prev: Decimal,
    totals: &DayTotals,
    till_sales_gross: Decimal,
    uses_till_netting: bool,
) -> Decimal {
    let mut amount =
        carryover_prev + (totals.weight_sales - totals.expenses) - totals.verified_deposits;
    if uses_till_netting {
        amount -= till_sales_gross;
    }
    amount
}

/// Seed quantities for tomorrow's opening rows: effective opening minus what
/// was counted out today, floored at zero. Items never closed today carry
/// their full effective opening forward. Zero results are omitted; absent
/// rows represent zero stock.
pub fn next_opening(
    opening_effective: &HashMap<String, Decimal>,
    closings: &[ClosingLine],
) -> HashMap<String, Decimal> {
    let closed: HashMap<&str, &ClosingLine> = closings
        .iter()
        .map(|line| (line.item_key.as_str(), line))
        .collect();

    let mut keys: Vec<&str> = opening_effective.keys().map(String::as_str).collect();
    for line in closings {
        if !opening_effective.contains_key(&line.item_key) {
            keys.push(line.item_key.as_str());
        }
    }

    let mut seeds = HashMap::new();
    for key in keys {
        let opening = opening_effective.get(key).copied().unwrap_or(Decimal::ZERO);
        let (closing_qty, waste_qty) = match closed.get(key) {
            Some(line) => (line.closing_qty, line.waste_qty),
            None => (Decimal::ZERO, Decimal::ZERO),
        };
        let qty = (opening - closing_qty - waste_qty).max(Decimal::ZERO);
        if qty > Decimal::ZERO {
            seeds.insert(key.to_string(), qty);
        }
    }
    seeds
}

/// Effective sell price per item for one outlet. An outlet price row wins
/// over the item default; inactive at either level means the item is not
/// sellable and prices at zero.
pub fn resolve_prices(outlet_rows: &[PriceRow], items: &[Item]) -> HashMap<String, Decimal> {
    let mut prices: HashMap<String, Decimal> = HashMap::new();

    for item in items {
        let price = if item.is_active {
            item.default_sell_price
        } else {
            Decimal::ZERO
        };
        prices.insert(item.item_key.clone(), price);
    }

    for row in outlet_rows {
        let price = if row.is_active {
            row.sell_price
        } else {
            Decimal::ZERO
        };
        prices.insert(row.item_key.clone(), price);
    }

    prices
}

/// Rebuilds day inputs from a frozen snapshot. Prices come from the
/// snapshot's own closing lines; verified deposits stay live because deposit
/// rows are never rotated away.
pub fn day_inputs_from_snapshot(body: &SnapshotBody, verified_deposits: Decimal) -> DayInputs {
    let opening_effective: HashMap<String, Decimal> = body
        .opening
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();

    let closings: Vec<ClosingLine> = body
        .closings
        .iter()
        .map(|line| ClosingLine {
            item_key: line.item_key.clone(),
            closing_qty: line.closing_qty,
            waste_qty: line.waste_qty,
        })
        .collect();

    let prices: HashMap<String, Decimal> = body
        .closings
        .iter()
        .map(|line| (line.item_key.clone(), line.sell_price))
        .collect();

    let expenses_total = body
        .expenses
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc + line.amount);

    DayInputs {
        opening_effective,
        closings,
        prices,
        expenses_total,
        verified_deposits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::period::{SnapshotClosingLine, SnapshotExpenseLine};
    use std::collections::BTreeMap;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn closing(key: &str, closing_qty: i64, waste_qty: i64) -> ClosingLine {
        ClosingLine {
            item_key: key.to_string(),
            closing_qty: dec(closing_qty),
            waste_qty: dec(waste_qty),
        }
    }

    fn inputs_for(
        opening: &[(&str, i64)],
        closings: Vec<ClosingLine>,
        prices: &[(&str, i64)],
        expenses: i64,
        deposits: i64,
    ) -> DayInputs {
        DayInputs {
            opening_effective: opening
                .iter()
                .map(|(k, v)| (k.to_string(), dec(*v)))
                .collect(),
            closings,
            prices: prices.iter().map(|(k, v)| (k.to_string(), dec(*v))).collect(),
            expenses_total: dec(expenses),
            verified_deposits: dec(deposits),
        }
    }

    #[test]
    fn sold_quantity_is_opening_minus_closing_minus_waste() {
        let inputs = inputs_for(
            &[("beef", 10)],
            vec![closing("beef", 6, 1)],
            &[("beef", 1000)],
            0,
            0,
        );
        let (sold, warnings) = sold_quantities(&inputs);
        assert_eq!(sold["beef"], dec(3));
        assert!(warnings.is_empty());
    }

    #[test]
    fn unclosed_items_are_excluded_from_sold_totals() {
        let inputs = inputs_for(
            &[("beef", 10), ("goat", 4)],
            vec![closing("beef", 6, 1)],
            &[("beef", 1000), ("goat", 800)],
            0,
            0,
        );
        let (sold, _) = sold_quantities(&inputs);
        assert!(!sold.contains_key("goat"));

        let totals = day_totals(&inputs);
        assert_eq!(totals.weight_sales, dec(3000));
    }

    #[test]
    fn negative_sold_is_clamped_with_a_warning() {
        // Closing counted more than was ever opened: late supply edit.
        let inputs = inputs_for(
            &[("beef", 5)],
            vec![closing("beef", 7, 0)],
            &[("beef", 1000)],
            0,
            0,
        );
        let totals = day_totals(&inputs);
        assert_eq!(totals.weight_sales, Decimal::ZERO);
        assert_eq!(
            totals.warnings,
            vec![ComputeWarning::NegativeSoldClamped {
                item_key: "beef".to_string(),
                raw: dec(-2),
            }]
        );
    }

    #[test]
    fn zero_price_warns_but_never_fails() {
        let inputs = inputs_for(
            &[("beef", 10), ("offal", 3)],
            vec![closing("beef", 6, 0), closing("offal", 1, 0)],
            &[("beef", 1000)], // no price for offal
            0,
            0,
        );
        let totals = day_totals(&inputs);
        // Offal contributes nothing but beef still counts.
        assert_eq!(totals.weight_sales, dec(4000));
        assert!(totals.warnings.iter().any(|w| matches!(
            w,
            ComputeWarning::MissingPrice { item_key, .. } if item_key == "offal"
        )));
    }

    #[test]
    fn waste_is_valued_at_the_resolved_price() {
        let inputs = inputs_for(
            &[("beef", 10)],
            vec![closing("beef", 6, 1)],
            &[("beef", 1000)],
            0,
            0,
        );
        let totals = day_totals(&inputs);
        assert_eq!(totals.waste_value, dec(1000));
    }

    #[test]
    fn outstanding_preserves_sign_on_over_deposit() {
        // Revenue 1000, no expenses, deposited 1500: the outlet is owed 500.
        let inputs = inputs_for(
            &[("beef", 2)],
            vec![closing("beef", 1, 0)],
            &[("beef", 1000)],
            0,
            1500,
        );
        let totals = day_totals(&inputs);
        assert_eq!(outstanding(&totals), dec(-500));
    }

    #[test]
    fn amount_to_deposit_applies_till_netting_only_when_flagged() {
        let totals = DayTotals {
            weight_sales: dec(3000),
            expenses: dec(200),
            verified_deposits: dec(1000),
            ..Default::default()
        };
        assert_eq!(
            amount_to_deposit(dec(500), &totals, dec(700), false),
            dec(2300)
        );
        assert_eq!(
            amount_to_deposit(dec(500), &totals, dec(700), true),
            dec(1600)
        );
    }

    #[test]
    fn three_day_reconciliation_scenario() {
        // Day 1: supply beef=10, closing=6, waste=1, price 1000,
        // expenses 200, deposits 1000.
        let day1 = inputs_for(
            &[("beef", 10)],
            vec![closing("beef", 6, 1)],
            &[("beef", 1000)],
            200,
            1000,
        );
        let day1_totals = day_totals(&day1);
        assert_eq!(day1_totals.weight_sales, dec(3000));
        let carryover_day2 = outstanding(&day1_totals);
        assert_eq!(carryover_day2, dec(1800));
        assert_eq!(
            amount_to_deposit(Decimal::ZERO, &day1_totals, Decimal::ZERO, false),
            dec(1800)
        );

        // Day 2 (after rotation cleared day 1): supply beef=5, closing=4.
        let day2 = inputs_for(
            &[("beef", 5)],
            vec![closing("beef", 4, 0)],
            &[("beef", 1000)],
            0,
            0,
        );
        let day2_totals = day_totals(&day2);
        assert_eq!(day2_totals.weight_sales, dec(1000));
        assert_eq!(
            amount_to_deposit(carryover_day2, &day2_totals, Decimal::ZERO, false),
            dec(2800)
        );

        // Day 3: no activity; the carryover is day 2's outstanding.
        let carryover_day3 = outstanding(&day2_totals);
        assert_eq!(carryover_day3, dec(1000));
    }

    #[test]
    fn snapshot_recomputation_matches_live_computation() {
        let live = inputs_for(
            &[("beef", 10), ("goat", 4)],
            vec![closing("beef", 6, 1), closing("goat", 2, 0)],
            &[("beef", 1000), ("goat", 800)],
            200,
            1000,
        );
        let live_totals = day_totals(&live);

        // Freeze the same day, then recompute from the frozen copy.
        let body = SnapshotBody {
            opening: BTreeMap::from([
                ("beef".to_string(), dec(10)),
                ("goat".to_string(), dec(4)),
            ]),
            closings: vec![
                SnapshotClosingLine {
                    item_key: "beef".to_string(),
                    closing_qty: dec(6),
                    waste_qty: dec(1),
                    sell_price: dec(1000),
                },
                SnapshotClosingLine {
                    item_key: "goat".to_string(),
                    closing_qty: dec(2),
                    waste_qty: dec(0),
                    sell_price: dec(800),
                },
            ],
            expenses: vec![SnapshotExpenseLine {
                amount: dec(200),
                note: None,
            }],
            gross_payments: Decimal::ZERO,
        };
        let from_snapshot = day_inputs_from_snapshot(&body, dec(1000));
        let snapshot_totals = day_totals(&from_snapshot);

        assert_eq!(snapshot_totals.weight_sales, live_totals.weight_sales);
        assert_eq!(snapshot_totals.expenses, live_totals.expenses);
        assert_eq!(snapshot_totals.waste_value, live_totals.waste_value);
        assert_eq!(outstanding(&snapshot_totals), outstanding(&live_totals));
    }

    #[test]
    fn next_opening_floors_at_zero_and_omits_empty_items() {
        let opening: HashMap<String, Decimal> = [
            ("beef".to_string(), dec(10)),
            ("goat".to_string(), dec(2)),
            ("offal".to_string(), dec(3)),
        ]
        .into_iter()
        .collect();
        let closings = vec![
            closing("beef", 6, 1),  // 10 - 6 - 1 = 3 carried
            closing("goat", 0, 0),  // sold out: omitted
            closing("fish", 0, 2),  // closed without opening: floored at 0
        ];
        let seeds = next_opening(&opening, &closings);
        assert_eq!(seeds.get("beef"), Some(&dec(3)));
        assert_eq!(seeds.get("goat"), None);
        assert_eq!(seeds.get("fish"), None);
        // Never closed today: the full effective opening carries forward.
        assert_eq!(seeds.get("offal"), Some(&dec(3)));
    }

    #[test]
    fn rotation_seed_is_stable_across_reruns() {
        let opening: HashMap<String, Decimal> =
            [("beef".to_string(), dec(10))].into_iter().collect();
        let closings = vec![closing("beef", 6, 1)];
        let first = next_opening(&opening, &closings);
        let second = next_opening(&opening, &closings);
        assert_eq!(first, second);
    }

    #[test]
    fn outlet_price_row_overrides_item_default() {
        use chrono::Utc;
        use uuid::Uuid;

        let outlet_id = Uuid::new_v4();
        let items = vec![
            Item {
                id: Uuid::new_v4(),
                item_key: "beef".to_string(),
                name: "Beef".to_string(),
                unit: "kg".to_string(),
                default_sell_price: dec(600),
                is_active: true,
                created_at: Utc::now(),
            },
            Item {
                id: Uuid::new_v4(),
                item_key: "goat".to_string(),
                name: "Goat".to_string(),
                unit: "kg".to_string(),
                default_sell_price: dec(800),
                is_active: false,
                created_at: Utc::now(),
            },
        ];
        let rows = vec![PriceRow {
            id: Uuid::new_v4(),
            outlet_id,
            item_key: "beef".to_string(),
            sell_price: dec(1000),
            is_active: true,
            updated_at: Utc::now(),
        }];

        let prices = resolve_prices(&rows, &items);
        assert_eq!(prices["beef"], dec(1000));
        // Inactive item with no outlet override prices at zero.
        assert_eq!(prices["goat"], Decimal::ZERO);
    }

    #[test]
    fn inactive_outlet_price_row_zeroes_the_item() {
        use chrono::Utc;
        use uuid::Uuid;

        let items = vec![Item {
            id: Uuid::new_v4(),
            item_key: "beef".to_string(),
            name: "Beef".to_string(),
            unit: "kg".to_string(),
            default_sell_price: dec(600),
            is_active: true,
            created_at: Utc::now(),
        }];
        let rows = vec![PriceRow {
            id: Uuid::new_v4(),
            outlet_id: Uuid::new_v4(),
            item_key: "beef".to_string(),
            sell_price: dec(1000),
            is_active: false,
            updated_at: Utc::now(),
        }];

        let prices = resolve_prices(&rows, &items);
        assert_eq!(prices["beef"], Decimal::ZERO);
    }
}
