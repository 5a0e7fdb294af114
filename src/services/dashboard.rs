use chrono::Datelike;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::syllabi;
use crate::error::AppError;
use crate::models::{Card, CardFilter, SyllabusStatus, User};

const HEBREW_MONTHS: [&str; 12] = [
    "ינואר",
    "פברואר",
    "מרץ",
    "אפריל",
    "מאי",
    "יוני",
    "יולי",
    "אוגוסט",
    "ספטמבר",
    "אוקטובר",
    "נובמבר",
    "דצמבר",
];

/// Cards submitted in one calendar month.
#[derive(Debug, Serialize)]
pub struct DateSection {
    /// Hebrew month name and year, e.g. `מרץ 2025`.
    pub date_label: String,
    pub cards: Vec<Card>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct CardCounts {
    pub total: usize,
    pub drafts: usize,
    pub in_review: usize,
    pub approved: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardContent {
    #[serde(flatten)]
    pub counts: CardCounts,
    pub date_sections: Vec<DateSection>,
}

#[derive(Debug, Serialize)]
pub struct HeaderData {
    pub title: &'static str,
    pub name: String,
}

/// Full-page view data: page header plus page body.
#[derive(Debug, Serialize)]
pub struct PageData<T> {
    pub header: HeaderData,
    pub content: T,
}

impl<T> PageData<T> {
    pub fn new(title: &'static str, user: &User, content: T) -> Self {
        Self {
            header: HeaderData {
                title,
                name: user.name.clone(),
            },
            content,
        }
    }
}

pub struct DashboardService {
    db: SqlitePool,
}

impl DashboardService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Cards visible to `user` that match `filter`, grouped by month.
    /// Managers see every lecturer's syllabi.
    pub async fn overview(&self, user: &User, mut filter: CardFilter) -> Result<DashboardContent, AppError> {
        filter.lecturer_id = if user.is_manager() { None } else { Some(user.id) };

        let cards = syllabi::fetch_cards(&self.db, &filter).await?;
        let counts = count_statuses(&cards);
        info!(
            "Loaded {} cards for user {}; Draft: {}, In Review: {}, Approved: {}",
            counts.total, user.id, counts.drafts, counts.in_review, counts.approved
        );

        Ok(DashboardContent {
            counts,
            date_sections: group_by_month(cards),
        })
    }
}

pub fn month_label(month: u32, year: i32) -> String {
    let name = HEBREW_MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or_default();
    format!("{} {}", name, year)
}

pub fn count_statuses(cards: &[Card]) -> CardCounts {
    let mut counts = CardCounts {
        total: cards.len(),
        ..CardCounts::default()
    };
    for card in cards {
        match card.status {
            SyllabusStatus::Draft => counts.drafts += 1,
            SyllabusStatus::InReview => counts.in_review += 1,
            SyllabusStatus::Approved => counts.approved += 1,
            SyllabusStatus::Deleted => {}
        }
    }
    counts
}

/// Groups cards by submission month, newest month first. Cards keep their
/// relative order within a month.
pub fn group_by_month(cards: Vec<Card>) -> Vec<DateSection> {
    let mut months: Vec<((i32, u32), DateSection)> = Vec::new();

    for card in cards {
        let key = (card.submitted_on.year(), card.submitted_on.month());
        match months.iter().position(|(k, _)| *k == key) {
            Some(i) => months[i].1.cards.push(card),
            None => months.push((
                key,
                DateSection {
                    date_label: month_label(key.1, key.0),
                    cards: vec![card],
                },
            )),
        }
    }

    months.sort_by(|(a, _), (b, _)| b.cmp(a));
    months.into_iter().map(|(_, section)| section).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn card(id: i64, date: &str, status: SyllabusStatus) -> Card {
        let submitted_on = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date");
        Card {
            id,
            title: format!("Course {}", id),
            date: submitted_on.format("%d/%m/%Y").to_string(),
            submitted_on,
            lecturer: "Dana Levi".to_string(),
            field: "Mathematics".to_string(),
            status,
        }
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(1, 2025), "ינואר 2025");
        assert_eq!(month_label(12, 2024), "דצמבר 2024");
    }

    #[test]
    fn test_group_by_month_newest_first() {
        let sections = group_by_month(vec![
            card(1, "2025-03-10", SyllabusStatus::Draft),
            card(2, "2024-12-01", SyllabusStatus::Approved),
            card(3, "2025-05-02", SyllabusStatus::InReview),
            card(4, "2025-03-01", SyllabusStatus::InReview),
        ]);

        let labels: Vec<&str> = sections.iter().map(|s| s.date_label.as_str()).collect();
        assert_eq!(labels, vec!["מאי 2025", "מרץ 2025", "דצמבר 2024"]);

        let march: Vec<i64> = sections[1].cards.iter().map(|c| c.id).collect();
        assert_eq!(march, vec![1, 4]);
    }

    #[test]
    fn test_same_month_different_years_are_separate() {
        let sections = group_by_month(vec![
            card(1, "2024-03-10", SyllabusStatus::Draft),
            card(2, "2025-03-10", SyllabusStatus::Draft),
        ]);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].date_label, "מרץ 2025");
    }

    #[test]
    fn test_count_statuses() {
        let counts = count_statuses(&[
            card(1, "2025-03-10", SyllabusStatus::Draft),
            card(2, "2025-03-10", SyllabusStatus::InReview),
            card(3, "2025-03-10", SyllabusStatus::InReview),
            card(4, "2025-03-10", SyllabusStatus::Approved),
        ]);
        assert_eq!(
            counts,
            CardCounts {
                total: 4,
                drafts: 1,
                in_review: 2,
                approved: 1,
            }
        );
    }

    #[test]
    fn test_no_cards() {
        assert!(group_by_month(Vec::new()).is_empty());
        assert_eq!(count_statuses(&[]), CardCounts::default());
    }
}
