//! Assertions over normalized results

use common::{LedgerEntry, OrderBook};
use rest::SignedRequest;

/// Bids strictly descending and asks strictly ascending, best level first
///
/// # Panics
/// When either side is out of order or the book is crossed
pub fn assert_book_sorted(book: &OrderBook) {
    for pair in book.bids.windows(2) {
        assert!(
            pair[0].price > pair[1].price,
            "bids out of order: {} then {}",
            pair[0].price,
            pair[1].price
        );
    }
    for pair in book.asks.windows(2) {
        assert!(
            pair[0].price < pair[1].price,
            "asks out of order: {} then {}",
            pair[0].price,
            pair[1].price
        );
    }
    if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
        assert!(bid.price < ask.price, "crossed book: bid {} >= ask {}", bid.price, ask.price);
    }
}

/// Every value greater than the previous one
///
/// # Panics
/// On the first value that is not
pub fn assert_strictly_increasing<T: PartialOrd + std::fmt::Debug>(values: &[T]) {
    for pair in values.windows(2) {
        assert!(pair[0] < pair[1], "{:?} is not below {:?}", pair[0], pair[1]);
    }
}

/// Ledger in chronological order
///
/// # Panics
/// When an entry precedes the one before it
pub fn assert_ledger_chronological(entries: &[LedgerEntry]) {
    for pair in entries.windows(2) {
        assert!(
            pair[0].timestamp <= pair[1].timestamp,
            "ledger entry {} at {} precedes {} at {}",
            pair[1].id,
            pair[1].timestamp,
            pair[0].id,
            pair[0].timestamp
        );
    }
}

/// Request carries `name` with exactly `value` (case-insensitive name)
///
/// # Panics
/// When the header is missing or differs
pub fn assert_header(request: &SignedRequest, name: &str, value: &str) {
    assert_eq!(
        request.header(name),
        Some(value),
        "header {name} on {} {}",
        request.method,
        request.url
    );
}
