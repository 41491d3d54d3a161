use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::ids::{BookingId, PropertyId};
use crate::macros::storage_labels;

/// Calendar channel a booking (and therefore a cleaning) originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum BookingSource {
    Airbnb,
    Booking,
    Oktorate,
    Manual,
}

storage_labels!(BookingSource, "booking source", {
    Airbnb => "AIRBNB",
    Booking => "BOOKING",
    Oktorate => "OKTORATE",
    Manual => "MANUAL",
});

/// Persisted booking, keyed by `(source, external_uid)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Booking {
    pub id: BookingId,
    pub property_id: PropertyId,
    pub source: BookingSource,
    pub external_uid: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests_count: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One checkout observed by the calendar fetcher during a sync pass.
///
/// Feeds are at-least-once: the same tuple may arrive many times, in any
/// order, across overlapping passes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BookingTuple {
    #[cfg_attr(feature = "serde", serde(alias = "property_id"))]
    pub property_id: PropertyId,
    #[cfg_attr(feature = "serde", serde(alias = "check_in"))]
    pub check_in: NaiveDateTime,
    #[cfg_attr(feature = "serde", serde(alias = "check_out"))]
    pub check_out: NaiveDateTime,
    pub source: BookingSource,
    #[cfg_attr(feature = "serde", serde(alias = "external_uid"))]
    pub external_uid: String,
}

impl BookingTuple {
    /// The cleaning slot this checkout maps to (time of day stripped).
    pub fn checkout_date(&self) -> NaiveDate {
        self.check_out.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_labels_round_trip() {
        for source in BookingSource::ALL {
            let parsed: BookingSource = source.as_str().parse().unwrap();
            assert_eq!(parsed, *source);
        }
        assert_eq!("airbnb".parse::<BookingSource>().unwrap(), BookingSource::Airbnb);
        assert!("VRBO".parse::<BookingSource>().is_err());
    }

    #[test]
    fn checkout_date_drops_time_of_day() {
        let tuple = BookingTuple {
            property_id: PropertyId::new(),
            check_in: NaiveDate::from_ymd_opt(2026, 2, 5)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 2, 8)
                .unwrap()
                .and_hms_opt(23, 59, 0)
                .unwrap(),
            source: BookingSource::Airbnb,
            external_uid: "HMABC123".into(),
        };
        assert_eq!(
            tuple.checkout_date(),
            NaiveDate::from_ymd_opt(2026, 2, 8).unwrap()
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn tuple_accepts_camel_case_and_snake_case_keys() {
        let property_id = PropertyId::new();
        let camel = format!(
            r#"{{"propertyId":"{property_id}","checkIn":"2026-02-05T15:00:00","checkOut":"2026-02-08T10:00:00","source":"AIRBNB","externalUid":"HMABC123"}}"#
        );
        let snake = format!(
            r#"{{"property_id":"{property_id}","check_in":"2026-02-05T15:00:00","check_out":"2026-02-08T10:00:00","source":"AIRBNB","external_uid":"HMABC123"}}"#
        );

        let from_camel: BookingTuple = serde_json::from_str(&camel).unwrap();
        let from_snake: BookingTuple = serde_json::from_str(&snake).unwrap();
        assert_eq!(from_camel, from_snake);
        assert_eq!(from_camel.property_id, property_id);
        assert_eq!(from_camel.external_uid, "HMABC123");
    }
}
