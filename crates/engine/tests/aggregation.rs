use engine::{
    CategoryRef, Money, Period, PeriodView, SortKey, Transaction, TransactionType, ViewMemo,
    all_time_stats, category_totals, filter_by_period, period_net_total, sort_transactions,
};

fn tx(
    id: i64,
    kind: TransactionType,
    amount_cents: i64,
    category: Option<&str>,
    date: &str,
) -> Transaction {
    Transaction {
        id,
        title: format!("tx {id}"),
        amount: Money::new(amount_cents),
        category: category.map(|name| CategoryRef {
            id: name.len() as i64,
            name: name.to_string(),
        }),
        date: date.to_string(),
        kind,
    }
}

fn titled(id: i64, title: &str, amount_cents: i64) -> Transaction {
    Transaction {
        title: title.to_string(),
        ..tx(id, TransactionType::Expense, amount_cents, Some("Food"), "2024-03-01")
    }
}

fn march() -> Period {
    "2024-03".parse().unwrap()
}

fn scenario() -> Vec<Transaction> {
    vec![
        tx(1, TransactionType::Income, 100_000, None, "2024-03-01"),
        tx(2, TransactionType::Expense, 30_000, Some("Food"), "2024-03-05"),
        tx(3, TransactionType::Expense, 5_000, Some("Food"), "2024-04-01"),
    ]
}

fn ids<T: std::borrow::Borrow<Transaction>>(items: &[T]) -> Vec<i64> {
    items.iter().map(|t| t.borrow().id).collect()
}

#[test]
fn monthly_scenario_matches_expected_totals() {
    let all = scenario();
    let filtered = filter_by_period(&all, march());

    assert_eq!(ids(&filtered), vec![1, 2]);
    assert_eq!(period_net_total(filtered.iter().copied()), Money::new(70_000));

    let totals = category_totals(filtered.iter().copied());
    assert_eq!(totals.len(), 1);
    assert_eq!(totals.get("Food"), Some(&Money::new(30_000)));
}

#[test]
fn filter_preserves_input_order_and_skips_bad_dates() {
    let all = vec![
        tx(1, TransactionType::Expense, 100, None, "2024-03-20"),
        tx(2, TransactionType::Expense, 100, None, "2024-03-xx"),
        tx(3, TransactionType::Expense, 100, None, ""),
        tx(4, TransactionType::Expense, 100, None, "2024-03-02"),
        tx(5, TransactionType::Expense, 100, None, "2023-03-02"),
    ];

    assert_eq!(ids(&filter_by_period(&all, march())), vec![1, 4]);
}

#[test]
fn malformed_dates_still_count_all_time() {
    let all = vec![
        tx(1, TransactionType::Income, 500, None, "not a date"),
        tx(2, TransactionType::Expense, 200, None, "2024-03-02"),
    ];

    let stats = all_time_stats(&all);
    assert_eq!(stats.income, Money::new(500));
    assert_eq!(stats.expense, Money::new(200));
    assert_eq!(stats.balance, stats.income - stats.expense);
}

#[test]
fn category_totals_ignore_income_and_group_uncategorized() {
    let all = vec![
        tx(1, TransactionType::Income, 900, Some("Food"), "2024-03-01"),
        tx(2, TransactionType::Expense, 100, None, "2024-03-01"),
        tx(3, TransactionType::Expense, 250, Some("Bills"), "2024-03-01"),
        tx(4, TransactionType::Expense, 50, Some("Bills"), "2024-03-02"),
    ];

    let totals = category_totals(&all);
    assert_eq!(totals.get("Food"), None);
    assert_eq!(totals.get("Uncategorized"), Some(&Money::new(100)));
    assert_eq!(totals.get("Bills"), Some(&Money::new(300)));

    let expense_sum: Money = all
        .iter()
        .filter(|t| t.kind == TransactionType::Expense)
        .map(|t| t.amount)
        .sum();
    assert_eq!(totals.values().copied().sum::<Money>(), expense_sum);
}

#[test]
fn empty_input_yields_zeroes() {
    let empty: Vec<Transaction> = Vec::new();
    assert!(filter_by_period(&empty, march()).is_empty());
    assert!(category_totals(&empty).is_empty());
    assert_eq!(period_net_total(&empty), Money::ZERO);
    assert_eq!(all_time_stats(&empty), engine::Stats::default());
}

#[test]
fn sort_none_keeps_input_order() {
    let mut items = vec![titled(1, "b", 300), titled(2, "a", 100), titled(3, "c", 200)];
    sort_transactions(&mut items, SortKey::None);
    assert_eq!(ids(&items), vec![1, 2, 3]);
}

#[test]
fn amount_sorts_are_stable() {
    let base = vec![
        titled(1, "x", 200),
        titled(2, "x", 100),
        titled(3, "x", 200),
        titled(4, "x", 300),
        titled(5, "x", 100),
    ];

    let mut asc = base.clone();
    sort_transactions(&mut asc, SortKey::AmountAsc);
    assert_eq!(ids(&asc), vec![2, 5, 1, 3, 4]);

    let mut desc = asc.clone();
    sort_transactions(&mut desc, SortKey::AmountDesc);
    assert_eq!(ids(&desc), vec![4, 1, 3, 2, 5]);

    let mut direct = base;
    sort_transactions(&mut direct, SortKey::AmountDesc);
    assert_eq!(ids(&direct), ids(&desc));
}

#[test]
fn title_sort_is_locale_aware() {
    let mut items = vec![
        titled(1, "zebra", 1),
        titled(2, "Żabka", 1),
        titled(3, "apple", 1),
        titled(4, "Banana", 1),
        titled(5, "éclair", 1),
    ];

    sort_transactions(&mut items, SortKey::TitleAsc);
    assert_eq!(ids(&items), vec![3, 4, 5, 2, 1]);

    sort_transactions(&mut items, SortKey::TitleDesc);
    assert_eq!(ids(&items), vec![1, 2, 5, 4, 3]);
}

#[test]
fn sort_works_on_borrowed_views() {
    let all = vec![titled(1, "b", 300), titled(2, "a", 100)];
    let mut view: Vec<&Transaction> = all.iter().collect();
    sort_transactions(&mut view, SortKey::AmountAsc);
    assert_eq!(ids(&view), vec![2, 1]);
}

#[test]
fn sort_key_parses_menu_values() {
    assert_eq!("".parse::<SortKey>().unwrap(), SortKey::None);
    assert_eq!("amount-desc".parse::<SortKey>().unwrap(), SortKey::AmountDesc);
    assert!("price".parse::<SortKey>().is_err());
}

#[test]
fn period_view_bundles_everything() {
    let all = scenario();
    let view = PeriodView::compute(&all, march(), SortKey::AmountAsc);

    assert_eq!(ids(&view.transactions), vec![2, 1]);
    assert_eq!(view.net_total, Money::new(70_000));
    assert_eq!(view.stats.income, Money::new(100_000));
    assert_eq!(view.stats.expense, Money::new(35_000));
    assert_eq!(view.stats.balance, Money::new(65_000));
}

#[test]
fn memo_recomputes_only_when_inputs_change() {
    let all = scenario();
    let mut memo = ViewMemo::new();

    memo.get(1, &all, march(), SortKey::None);
    memo.get(1, &all, march(), SortKey::None);
    assert_eq!(memo.computations(), 1);

    memo.get(1, &all, march(), SortKey::TitleAsc);
    assert_eq!(memo.computations(), 2);

    memo.get(2, &all, march(), SortKey::TitleAsc);
    assert_eq!(memo.computations(), 3);

    let april = memo.get(2, &all, march().next(), SortKey::TitleAsc);
    assert_eq!(ids(&april.transactions), vec![3]);
    assert_eq!(memo.computations(), 4);
}

#[test]
fn huge_stored_amounts_do_not_overflow_totals() {
    let json = r#"[
        {"id":1,"title":"a","amount":50000000000000000,"category":null,"date":"2024-03-01","type":"income"},
        {"id":2,"title":"b","amount":50000000000000000,"category":null,"date":"2024-03-02","type":"income"},
        {"id":3,"title":"c","amount":50000000000000000,"category":{"id":1,"name":"Food"},"date":"2024-03-03","type":"expense"},
        {"id":4,"title":"d","amount":50000000000000000,"category":{"id":1,"name":"Food"},"date":"2024-03-04","type":"expense"}
    ]"#;
    let all: Vec<Transaction> = serde_json::from_str(json).unwrap();
    let max = Money::new(i64::MAX);

    let stats = all_time_stats(&all);
    assert_eq!(stats.income, max);
    assert_eq!(stats.expense, max);
    assert_eq!(stats.balance, Money::ZERO);

    let in_march = filter_by_period(&all, march());
    assert_eq!(category_totals(in_march.iter().copied())["Food"], max);
    assert_eq!(period_net_total(all.iter().take(2)), max);
}
