//! The vehicle document returned by the registry.

use serde::{Deserialize, Serialize};

/// One vehicle as stored in the registry.
///
/// The controller never inspects it beyond [`spoken_summary`]; it is held as
/// the current result and handed to the presentation layer unchanged.
///
/// [`spoken_summary`]: VehicleRecord::spoken_summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Normalized registration number.
    pub reg: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    /// Asking price in rupees.
    pub price: f64,
    /// Odometer reading in kilometres.
    pub kms: u64,
    pub fuel: String,
    pub transmission: String,
    pub owner: String,
    pub description: String,
    /// Public URLs of uploaded photos.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_sold: bool,
}

impl VehicleRecord {
    /// Short sentence read out by the announcer after a successful search.
    ///
    /// ```
    /// # use vehicle_voice_search::search::VehicleRecord;
    /// # let record = VehicleRecord {
    /// #     reg: "MH12AB1234".into(), brand: "Honda".into(), model: "City".into(),
    /// #     year: 2019, price: 650000.0, kms: 42000, fuel: "Petrol".into(),
    /// #     transmission: "Manual".into(), owner: "First".into(),
    /// #     description: String::new(), images: vec![], is_sold: false,
    /// # };
    /// assert_eq!(
    ///     record.spoken_summary(),
    ///     "MH12AB1234. 2019 Honda City. Price 650000 rupees. 42000 kilometres. Petrol, Manual."
    /// );
    /// ```
    pub fn spoken_summary(&self) -> String {
        let mut summary = format!(
            "{}. {} {} {}. Price {:.0} rupees. {} kilometres. {}, {}.",
            self.reg,
            self.year,
            self.brand,
            self.model,
            self.price,
            self.kms,
            self.fuel,
            self.transmission,
        );
        if self.is_sold {
            summary.push_str(" Sold.");
        }
        summary
    }
}

#[cfg(test)]
pub(crate) fn sample_record(reg: &str) -> VehicleRecord {
    VehicleRecord {
        reg: reg.into(),
        brand: "Honda".into(),
        model: "City".into(),
        year: 2019,
        price: 650_000.0,
        kms: 42_000,
        fuel: "Petrol".into(),
        transmission: "Manual".into(),
        owner: "First".into(),
        description: "Single owner, service history".into(),
        images: vec![],
        is_sold: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_registry_document_without_optional_fields() {
        let json = r#"{
            "reg": "KA01AB0001", "brand": "Maruti", "model": "Swift",
            "year": 2021, "price": 550000, "kms": 12000, "fuel": "Petrol",
            "transmission": "Manual", "owner": "First", "description": "Clean"
        }"#;

        let record: VehicleRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.reg, "KA01AB0001");
        assert_eq!(record.price, 550_000.0);
        assert!(record.images.is_empty());
        assert!(!record.is_sold);
    }

    #[test]
    fn sold_vehicles_say_so() {
        let mut record = sample_record("MH12AB1234");
        record.is_sold = true;
        assert!(record.spoken_summary().ends_with("Sold."));
    }

    #[test]
    fn summary_rounds_fractional_price() {
        let mut record = sample_record("MH12AB1234");
        record.price = 499_999.6;
        assert!(record.spoken_summary().contains("Price 500000 rupees"));
    }
}
