// The June 1786 journey to Normandy, drawn as a polyline on the normandie layer
use geo::{Distance, Geodesic, Point};

pub const NORMANDIE_ROUTE_TITLE: &str = "Voyage en Normandie";
pub const NORMANDIE_ROUTE_DATES: &str = "21-29 juin 1786";
pub const NORMANDIE_ROUTE_NOTE: &str = "Visite de Louis XVI à Cherbourg";

/// (lat, lon) stops, leaving from and returning to Versailles.
pub const NORMANDIE_ROUTE: [(f64, f64); 11] = [
    (48.80452438239178, 2.1215883760563514),  // Versailles
    (48.7534847, 0.740002),                   // Chandai
    (49.173938600768544, 0.7863978614955963), // Harcourt
    (49.655778138925584, -1.63536823180084),  // Cherbourg
    (49.2751306, -1.1458554),                 // Montmartin
    (49.186695373508485, -0.36301474616409674), // Caen
    (49.4197222, 0.2338889),                  // Honfleur
    (49.4857290969773, 0.10698682195733893),  // Le Havre
    (49.4404591, 1.0939658),                  // Rouen
    (49.160903871171996, 1.329870183161747),  // Gaillon
    (48.80452438239178, 2.1215883760563514),  // Versailles
];

/// Geodesic length of a polyline in meters.
pub fn route_length(route: &[(f64, f64)]) -> f64 {
    route
        .windows(2)
        .map(|w| {
            let start = Point::new(w[0].1, w[0].0);
            let end = Point::new(w[1].1, w[1].0);
            Geodesic.distance(start, end)
        })
        .sum()
}

/// < 1000m: meters without decimals; otherwise km with 2 decimals
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 { format!("{:.0} m", meters) } else { format!("{:.2} km", meters / 1000.0) }
}
