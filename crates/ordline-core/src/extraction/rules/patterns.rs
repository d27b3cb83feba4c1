//! Common regex patterns for order-summary line classification.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amounts: "25.00 ₽", "1 250,00 ₽", "75₽", "1200 руб."
    pub static ref MONEY_LINE: Regex = Regex::new(
        r"(?i)^(\d+(?: \d{3})*)(?:[.,](\d{1,2}))? ?(?:₽|руб\.?|rub)$"
    ).unwrap();

    // Grand total printed as a bare amount: "63376 ₽"
    pub static ref BARE_TOTAL: Regex = Regex::new(
        r"(?i)^\d+ ?(?:₽|руб\.?|rub)$"
    ).unwrap();

    pub static ref CURRENCY_MARK: Regex = Regex::new(
        r"(?i)₽|руб|\brub\b"
    ).unwrap();

    pub static ref INTEGER_LINE: Regex = Regex::new(
        r"^\d+$"
    ).unwrap();

    // Physical dimensions: "24x10x5 mm", "1200 × 600 мм", "30*40 см"
    pub static ref DIMENSION: Regex = Regex::new(
        r"(?i)\d+(?:[.,]\d+)?\s*[xх×*]\s*\d+(?:[.,]\d+)?(?:\s*[xх×*]\s*\d+(?:[.,]\d+)?)?\s*(?:mm|мм|cm|см|m|м)\b\.?"
    ).unwrap();

    // Weight: "0.5 kg", "12,3 кг"
    pub static ref WEIGHT: Regex = Regex::new(
        r"(?i)\d+(?:[.,]\d+)?\s*(?:kg|кг)\b\.?"
    ).unwrap();

    // Dimension or weight fragment embedded in a name, with an optional label
    pub static ref DIMENSION_FRAGMENT: Regex = Regex::new(
        r"(?i)(?:(?:габариты|размеры?|dimensions|size|вес|weight)\s*:?\s*)?(?:\d+(?:[.,]\d+)?\s*[xх×*]\s*\d+(?:[.,]\d+)?(?:\s*[xх×*]\s*\d+(?:[.,]\d+)?)?\s*(?:mm|мм|cm|см|m|м)\b\.?|\d+(?:[.,]\d+)?\s*(?:kg|кг)\b\.?)"
    ).unwrap();

    // Dimension-shaped word token: "24x10x5", "600×600"
    pub static ref DIMENSION_TOKEN: Regex = Regex::new(
        r"(?i)^\d+(?:[.,]\d+)?(?:[xх×*]\d+(?:[.,]\d+)?)+$"
    ).unwrap();

    pub static ref DECIMAL_TOKEN: Regex = Regex::new(
        r"^\d+(?:[.,]\d+)?$"
    ).unwrap();

    pub static ref UNIT_TOKEN: Regex = Regex::new(
        r"(?i)^(?:mm|мм|cm|см|kg|кг)\.?$"
    ).unwrap();

    // Footers: "Page: 2", "Страница 1 из 3"
    pub static ref PAGE_FOOTER: Regex = Regex::new(
        r"(?i)^(?:page|страница|стр\.)\s*:?\s*\d*(?:\s*(?:of|из|/)\s*\d+)?$|^(?:page|страница)\s*:"
    ).unwrap();

    pub static ref FOOTER_MARKER: Regex = Regex::new(
        r"(?i)\b(?:page|страница)\s*:"
    ).unwrap();

    // Cover-page boilerplate and project-cost banners
    pub static ref BOILERPLATE: Regex = Regex::new(
        r"(?i)^(?:order summary|спецификация(?: заказа)?|коммерческое предложение|создано (?:в|с помощью)|created (?:with|in)|project cost|стоимость проекта|стоимость заказа)\b"
    ).unwrap();

    // Start of the trailing totals/contact block
    pub static ref TOTALS_START: Regex = Regex::new(
        r"(?i)^(?:итого|всего к оплате|grand total|order total|total weight|общий вес|вес заказа|max(?:imum)? order dimension|максимальный габарит|адрес|address|телефон|тел\.|phone|e-?mail|эл\. ?почта)(?:$|[\s:.,;])"
    ).unwrap();

    // Column label left at the start of a name
    pub static ref LEADING_LABEL: Regex = Regex::new(
        r"(?i)^(?:photo|item|фото|товар)\b[\s:]*"
    ).unwrap();

    // Product code: letter prefix, optional hyphen or space, digits, short suffix
    pub static ref PRODUCT_CODE: Regex = Regex::new(
        r"(?i)\b([a-zа-яё]{1,5})[- ]?(\d{2,6})([a-zа-яё]{0,2})\b"
    ).unwrap();

    // Run of multiplied operands after glyph unification: "24x10x5"
    pub static ref SIZE_RUN: Regex = Regex::new(
        r"\d+(?:x\d+)+"
    ).unwrap();
}

/// Column header labels, already folded by `fold_label`.
pub const HEADER_LABELS: &[&str] = &[
    "photo",
    "item",
    "dimensions",
    "weight",
    "unit price",
    "price",
    "quantity",
    "qty",
    "total",
    "фото",
    "товар",
    "наименование",
    "габариты",
    "вес",
    "цена",
    "цена за шт",
    "цена за единицу",
    "количество",
    "кол во",
    "сумма",
    "стоимость",
];

/// Color/finish vocabulary: (spelling, canonical slug).
pub const COLOR_WORDS: &[(&str, &str)] = &[
    ("white", "white"),
    ("black", "black"),
    ("grey", "grey"),
    ("gray", "grey"),
    ("silver", "silver"),
    ("gold", "gold"),
    ("bronze", "bronze"),
    ("chrome", "chrome"),
    ("белый", "white"),
    ("белая", "white"),
    ("белое", "white"),
    ("черный", "black"),
    ("чёрный", "black"),
    ("черная", "black"),
    ("чёрная", "black"),
    ("серый", "grey"),
    ("серая", "grey"),
    ("серебристый", "silver"),
    ("золотой", "gold"),
    ("бронза", "bronze"),
    ("хром", "chrome"),
];
