//! Demo dataset.

use master_maint_core::{Gender, Record, TabId, TabRecords};

/// Eight sample users spread over `tabA..tabD`, two per tab.
pub fn mock_dataset() -> TabRecords {
    let rows = [
        ("tabA", 1, "山田太郎", 30, Gender::Male, "東京都新宿区"),
        ("tabA", 2, "佐藤花子", 25, Gender::Female, "東京都渋谷区"),
        ("tabB", 3, "鈴木一郎", 42, Gender::Male, "大阪府大阪市"),
        ("tabB", 4, "田中美咲", 35, Gender::Female, "京都府京都市"),
        ("tabC", 5, "高橋健太", 28, Gender::Male, "神奈川県横浜市"),
        ("tabC", 6, "伊藤由美", 33, Gender::Female, "埼玉県さいたま市"),
        ("tabD", 7, "渡辺隆", 45, Gender::Male, "北海道札幌市"),
        ("tabD", 8, "小林直子", 27, Gender::Female, "福岡県福岡市"),
    ];

    let mut tabs = TabRecords::new();
    for (tab, id, name, age, gender, address) in rows {
        tabs.entry(TabId::from(tab))
            .or_insert_with(Vec::new)
            .push(Record::new(id, name, age, gender, address));
    }
    tabs
}
