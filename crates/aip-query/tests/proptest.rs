//! Property-based tests for ordering and page tokens using proptest.

use std::cmp::Ordering;

use aip_query::{ChaChaAead, CursorCodec, Error, Order, Record};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Record, Serialize, Deserialize)]
#[serde(default)]
struct Author {
    given_name: String,
    family_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record, Serialize, Deserialize)]
#[serde(default)]
struct Book {
    title: String,
    author: Option<Author>,
    page_count: i64,
    rating: f64,
    in_print: bool,
}

const ORDERS: &[&str] = &[
    "title",
    "page_count desc",
    "rating, title desc",
    "in_print desc, page_count",
    "author.family_name, author.given_name desc",
    "author.given_name desc, rating desc, title",
];

fn author_strategy() -> impl Strategy<Value = Option<Author>> {
    prop::option::of(("[a-c]{0,2}", "[a-c]{0,2}").prop_map(|(given_name, family_name)| Author {
        given_name,
        family_name,
    }))
}

fn book_strategy(rating: impl Strategy<Value = f64>) -> impl Strategy<Value = Book> {
    ("[a-c]{0,3}", author_strategy(), -3i64..3, rating, any::<bool>()).prop_map(
        |(title, author, page_count, rating, in_print)| Book {
            title,
            author,
            page_count,
            rating,
            in_print,
        },
    )
}

fn sortable_rating() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => (-4i32..4).prop_map(|r| f64::from(r) / 2.0),
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
        1 => any::<f64>(),
    ]
}

fn order_strategy() -> impl Strategy<Value = Order> {
    prop::sample::select(ORDERS).prop_map(|text| Order::parse(text).unwrap())
}

fn codec() -> CursorCodec<ChaChaAead> {
    CursorCodec::new(ChaChaAead::new(&[42u8; 32]))
}

// ============================================================================
// Comparator properties
// ============================================================================

proptest! {
    /// compare(a, b) is the reverse of compare(b, a).
    #[test]
    fn comparator_is_antisymmetric(
        a in book_strategy(sortable_rating()),
        b in book_strategy(sortable_rating()),
        order in order_strategy(),
    ) {
        let comparator = order.comparator::<Book>().unwrap();
        prop_assert_eq!(comparator.compare(&a, &b), comparator.compare(&b, &a).reverse());
        prop_assert!(!(comparator.less(&a, &b) && comparator.less(&b, &a)));
        prop_assert_eq!(comparator.compare(&a, &a), Ordering::Equal);
    }

    /// After sorting, no element is less than its predecessor.
    #[test]
    fn sort_is_consistent_with_less(
        mut books in prop::collection::vec(book_strategy(sortable_rating()), 0..20),
        order in order_strategy(),
    ) {
        let comparator = order.comparator::<Book>().unwrap();
        comparator.sort(&mut books);
        for pair in books.windows(2) {
            prop_assert!(!comparator.less(&pair[1], &pair[0]));
        }
    }

    /// Merging with a default never drops the caller's keys.
    #[test]
    fn merge_keeps_caller_prefix(order in order_strategy(), default in order_strategy()) {
        let merged = order.merge_with_default(&default);
        prop_assert_eq!(&merged.keys()[..order.len()], order.keys());
        prop_assert!(merged.len() <= order.len() + default.len());
    }
}

// ============================================================================
// Page token properties
// ============================================================================

proptest! {
    /// Decoding a fresh token yields the record projected onto the order.
    #[test]
    fn cursor_round_trip(
        book in book_strategy(sortable_rating()),
        order in order_strategy(),
        context in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let codec = codec();
        let token = codec.encode(&book, &order, &context).unwrap();
        let decoded: Book = codec.decode(&token, &order, &context).unwrap();
        let expected = aip_query::project(&book, &order).unwrap();
        // NaN != NaN, so floats are compared bit for bit.
        prop_assert_eq!(decoded.rating.to_bits(), expected.rating.to_bits());
        prop_assert_eq!(
            Book { rating: 0.0, ..decoded },
            Book { rating: 0.0, ..expected }
        );
    }

    /// Flipping any single bit of a token is detected.
    #[test]
    fn single_bit_tamper_is_rejected(
        book in book_strategy(sortable_rating()),
        order in order_strategy(),
        bit in any::<prop::sample::Index>(),
    ) {
        let codec = codec();
        let token = codec.encode(&book, &order, b"").unwrap();
        let mut raw = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let bit = bit.index(raw.len() * 8);
        raw[bit / 8] ^= 1 << (bit % 8);
        let tampered = URL_SAFE_NO_PAD.encode(raw);

        let result = codec.decode::<Book>(&tampered, &order, b"");
        prop_assert!(matches!(result, Err(Error::InvalidPageToken)));
    }

    /// A token made under one order never decodes under another.
    #[test]
    fn cursor_is_bound_to_its_order(
        book in book_strategy(sortable_rating()),
        created in order_strategy(),
        used in order_strategy(),
    ) {
        prop_assume!(created != used);
        let codec = codec();
        let token = codec.encode(&book, &created, b"").unwrap();
        let result = codec.decode::<Book>(&token, &used, b"");
        prop_assert!(matches!(result, Err(Error::InvalidPageToken)));
    }
}
