//! Demo dataset written on first run
//!
//! 两位农户、三位配送员、六条挂牌和六种作物的需求指标。
//! 不预置买家，买家通过注册创建。

use super::codes::random_code;
use crate::auth::passcode::hash_passcode;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shared::escrow::MarketplaceSnapshot;
use shared::models::{DeliveryAgent, DemandMetric, Farmer, Listing, ListingStatus};

/// (id, name, location, phone, passcode, rating, num_ratings, successful_deliveries)
const FARMERS: &[(&str, &str, &str, &str, &str, f64, u32, u32)] = &[
    ("F001", "አበበ ተስፋዬ", "አዲስ አበባ", "+251911234567", "1234", 4.5, 2, 5),
    ("F002", "ማርያም አለማየሁ", "ደብረ ማርቆስ", "+251922345678", "5678", 4.8, 3, 8),
];

/// (id, name, car_id, passcode)
const AGENTS: &[(&str, &str, &str, &str)] = &[
    ("DA001", "Meles Delivery", "ABC-1234", "1111"),
    ("DA002", "Kebede Transport", "XYZ-5678", "2222"),
    ("DA003", "Tadesse Logistics", "DEF-9012", "3333"),
];

/// (id, farmer_id, crop, crop_en, quantity, price_per_unit, unit, date_listed)
const LISTINGS: &[(&str, &str, &str, &str, i64, f64, &str, &str)] = &[
    ("L001", "F001", "ጤፍ", "Teff", 100, 3200.0, "quintal", "2024-01-15"),
    ("L002", "F001", "ቲማቲም", "Tomato", 200, 30.0, "kg", "2024-01-16"),
    ("L003", "F002", "ሽንኩርት", "Onion", 150, 40.0, "kg", "2024-01-17"),
    ("L004", "F002", "ድንች", "Potato", 300, 25.0, "kg", "2024-01-18"),
    ("L005", "F001", "ሙዝ", "Banana", 180, 35.0, "kg", "2024-01-19"),
    ("L006", "F002", "አቫካዶ", "Avocado", 120, 60.0, "kg", "2024-01-20"),
];

/// (crop, total_orders, avg_price)
const DEMAND: &[(&str, u64, f64)] = &[
    ("ጤፍ", 5, 50.0),
    ("ቲማቲም", 8, 30.0),
    ("ሽንኩርት", 6, 40.0),
    ("ድንች", 3, 25.0),
    ("ሙዝ", 4, 35.0),
    ("አቫካዶ", 2, 60.0),
];

/// Build the demo snapshot (passcodes hashed, farmer codes drawn fresh)
pub fn demo_snapshot(now: i64) -> Result<MarketplaceSnapshot, argon2::password_hash::Error> {
    let mut rng = StdRng::from_entropy();
    let mut snapshot = MarketplaceSnapshot {
        updated_at: now,
        ..Default::default()
    };

    for &(id, name, location, phone, passcode, rating, num_ratings, successful) in FARMERS {
        snapshot.farmers.push(Farmer {
            id: id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            phone: phone.to_string(),
            passcode_hash: hash_passcode(passcode)?,
            balance: 0.0,
            total_earned: 0.0,
            rating,
            num_ratings,
            successful_deliveries: successful,
        });
    }

    for &(id, name, car_id, passcode) in AGENTS {
        snapshot.delivery_agents.push(DeliveryAgent {
            id: id.to_string(),
            name: name.to_string(),
            car_id: car_id.to_string(),
            passcode_hash: Some(hash_passcode(passcode)?),
        });
    }

    for &(id, farmer_id, crop, crop_en, quantity, price, unit, date) in LISTINGS {
        snapshot.listings.push(Listing {
            id: id.to_string(),
            farmer_id: farmer_id.to_string(),
            crop: crop.to_string(),
            crop_en: crop_en.to_string(),
            quantity,
            price_per_unit: price,
            unit: unit.to_string(),
            farmer_code: Some(random_code(&mut rng)),
            date_listed: date.to_string(),
            status: ListingStatus::Available,
        });
    }

    for &(crop, total_orders, avg_price) in DEMAND {
        snapshot.demand_metrics.insert(
            crop.to_string(),
            DemandMetric {
                total_orders,
                avg_price,
            },
        );
    }

    Ok(snapshot)
}
