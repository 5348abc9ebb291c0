//! Dashboard aggregation
//!
//! Pure functions over a record snapshot. Grouping keys are exact,
//! case-sensitive strings and groups come out in order of first appearance
//! in the input sequence. Tonnage sums depend only on the set of records,
//! not on the order they arrive in.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::record::Record;

/// Headline numbers for the dashboard cards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_tons: f64,
    pub total_trips: usize,
    pub unique_people: usize,
}

/// Summed tonnage for one person or vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TonnageGroup {
    pub name: String,
    pub tons: f64,
    pub trips: usize,
}

/// Everything the dashboard renders from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub totals: Totals,
    pub by_person: Vec<TonnageGroup>,
    pub by_vehicle: Vec<TonnageGroup>,
}

pub fn totals(records: &[Record]) -> Totals {
    let unique_people: HashSet<&str> = records.iter().map(|r| r.person.as_str()).collect();

    Totals {
        total_tons: sum_tons(records.iter().map(|r| r.amount_tons).collect()),
        total_trips: records.len(),
        unique_people: unique_people.len(),
    }
}

pub fn group_by_person(records: &[Record]) -> Vec<TonnageGroup> {
    group_by(records, |r| &r.person)
}

pub fn group_by_vehicle(records: &[Record]) -> Vec<TonnageGroup> {
    group_by(records, |r| &r.vehicle)
}

pub fn dashboard(records: &[Record]) -> DashboardData {
    DashboardData {
        totals: totals(records),
        by_person: group_by_person(records),
        by_vehicle: group_by_vehicle(records),
    }
}

/// Sum in ascending order so any permutation of the same amounts rounds
/// the same way
fn sum_tons(mut amounts: Vec<f64>) -> f64 {
    amounts.sort_by(f64::total_cmp);
    amounts.iter().fold(0.0, |acc, t| acc + t)
}

fn group_by<F>(records: &[Record], key: F) -> Vec<TonnageGroup>
where
    F: Fn(&Record) -> &String,
{
    let mut groups: Vec<(&String, Vec<f64>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let name = key(record);
        match index.get(name.as_str()) {
            Some(&i) => groups[i].1.push(record.amount_tons),
            None => {
                index.insert(name.as_str(), groups.len());
                groups.push((name, vec![record.amount_tons]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(name, amounts)| TonnageGroup {
            name: name.clone(),
            trips: amounts.len(),
            tons: sum_tons(amounts),
        })
        .collect()
}
