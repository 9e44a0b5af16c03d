/// Reference price a candidate must strictly undercut before it is surfaced
/// as a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guardrail {
    /// Live flow: beat the last price the product actually sold at.
    LatestSale,
    /// Backfill flow: beat the undiscounted list price.
    ListPrice,
}

impl Guardrail {
    pub fn reference(&self, latest_price: f64, mrp: f64) -> f64 {
        match self {
            Guardrail::LatestSale => latest_price,
            Guardrail::ListPrice => mrp,
        }
    }

    /// True only when the candidate strictly lowers the reference price; a
    /// predicted increase or an exact match is never surfaced.
    pub fn admits(&self, predicted: f64, latest_price: f64, mrp: f64) -> bool {
        predicted < self.reference(latest_price, mrp)
    }
}
