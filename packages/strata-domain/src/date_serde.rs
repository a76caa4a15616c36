//! ISO-8601 calendar dates (`YYYY-MM-DD`) for optional entity fields.

use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match value {
		Some(date) => {
			let formatted = date.format(&ISO_DATE).map_err(serde::ser::Error::custom)?;

			serializer.serialize_some(&formatted)
		},
		None => serializer.serialize_none(),
	}
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	match raw {
		Some(text) if !text.trim().is_empty() =>
			Date::parse(text.trim(), &ISO_DATE).map(Some).map_err(serde::de::Error::custom),
		_ => Ok(None),
	}
}

pub fn to_iso(value: Option<Date>) -> String {
	value.and_then(|date| date.format(&ISO_DATE).ok()).unwrap_or_default()
}
