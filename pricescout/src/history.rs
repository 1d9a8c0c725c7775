use crate::query::SearchQuery;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

#[derive(Clone, Debug)]
pub struct SearchRecord {
    pub query: SearchQuery,
    pub results_count: usize,
    pub cached: bool,
    pub searched_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularSearch {
    pub country_code: String,
    pub product_type: String,
    pub min_price: u64,
    pub max_price: u64,
    pub count: usize,
    pub last_searched: DateTime<Utc>,
}

/// Bounded log of answered searches; the oldest records fall off first.
pub struct SearchHistory {
    capacity: usize,
    records: Mutex<VecDeque<SearchRecord>>,
}

impl SearchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    pub fn record(&self, query: &SearchQuery, results_count: usize, cached: bool) {
        if self.capacity == 0 {
            return;
        }
        let mut records = self.records.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(SearchRecord {
            query: query.clone(),
            results_count,
            cached,
            searched_at: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most searched queries, ties broken by recency.
    pub fn popular(&self, limit: usize) -> Vec<PopularSearch> {
        let records = self.records.lock();
        // (count, position of latest record, latest timestamp)
        let mut tally: HashMap<&SearchQuery, (usize, usize, DateTime<Utc>)> = HashMap::new();

        for (position, record) in records.iter().enumerate() {
            let slot = tally
                .entry(&record.query)
                .or_insert((0, position, record.searched_at));
            slot.0 += 1;
            slot.1 = position;
            slot.2 = record.searched_at;
        }

        let mut ranked: Vec<(&SearchQuery, (usize, usize, DateTime<Utc>))> =
            tally.into_iter().collect();
        ranked.sort_by(|(_, a), (_, b)| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        ranked
            .into_iter()
            .take(limit)
            .map(|(query, (count, _, last_searched))| PopularSearch {
                country_code: query.country_code().to_string(),
                product_type: query.product_type().to_string(),
                min_price: query.min_price(),
                max_price: query.max_price(),
                count,
                last_searched,
            })
            .collect()
    }
}
