//! Objective functions over peak discharges.

/// Root Mean Square Error. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> f64 {
    let n = observed.len() as f64;
    let mse: f64 = observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).powi(2))
        .sum::<f64>()
        / n;
    mse.sqrt()
}

/// RMSE of each return-period column over all rows.
pub fn column_rmse(observed: &[[f64; 3]], simulated: &[[f64; 3]]) -> [f64; 3] {
    std::array::from_fn(|col| {
        let o: Vec<f64> = observed.iter().map(|r| r[col]).collect();
        let s: Vec<f64> = simulated.iter().map(|r| r[col]).collect();
        rmse(&o, &s)
    })
}

/// Mean of the per-column RMSE.
pub fn mean_column_rmse(observed: &[[f64; 3]], simulated: &[[f64; 3]]) -> f64 {
    column_rmse(observed, simulated).iter().sum::<f64>() / 3.0
}

/// Signed relative difference in percent, `100 · (sim − obs) / obs`.
pub fn relative_difference(observed: f64, simulated: f64) -> f64 {
    100.0 * (simulated - observed) / observed
}
