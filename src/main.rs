use dustext::mixture::ResolvedRv;
use dustext::plot::{plot_curves, Series};
use dustext::units::angstrom_from_wavenumber;
use dustext::verifier::verify_law;
use dustext::{
    Calzetti, Cardelli, ExtinctionLaw, Fitzpatrick99, Gordon03SmcBar, LawParams, MixtureLaw,
    MixtureParams, Output,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::Write;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "dustext",
    version,
    about = "Interstellar dust extinction curves on a wavenumber grid"
)]
struct Args {
    /// cardelli | calzetti | f99 | gordon | mixture | all
    #[arg(long, default_value = "f99")]
    law: String,

    #[arg(long)]
    av: Option<f64>,
    /// R(V); effective R(V) for a mixture
    #[arg(long)]
    rv: Option<f64>,
    /// R(V) of the bump component (mixture only)
    #[arg(long)]
    rv_a: Option<f64>,
    /// R(V) of the bumpless component (mixture only)
    #[arg(long)]
    rv_b: Option<f64>,
    /// Bump fraction f_A (mixture only)
    #[arg(long)]
    f_a: Option<f64>,
    /// Write optical depth instead of A(λ)
    #[arg(long, action = clap::ArgAction::SetTrue)]
    tau: bool,
    /// Comma-separated R(V) values; one curve per value (single laws)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    rv_sweep: Vec<f64>,
    /// Comma-separated f_A values; one curve per value (mixture only)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    f_a_sweep: Vec<f64>,

    #[arg(long, default_value_t = 0.1)]
    x_min: f64,
    #[arg(long, default_value_t = 10.0)]
    x_max: f64,
    #[arg(long, default_value_t = 0.1)]
    x_step: f64,

    /// JSON file with evaluation parameters; flags override it
    #[arg(long)]
    params: Option<String>,

    #[arg(long, default_value = "out")]
    out_dir: String,
    #[arg(long = "no-draw", action = clap::ArgAction::SetFalse, default_value_t = true)]
    draw: bool,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Serialize)]
struct Row {
    x: f64,
    lambda_aa: f64,
    value: f64,
}

fn load_params(args: &Args) -> Result<MixtureParams> {
    let mut p = match &args.params {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<MixtureParams>(&text).with_context(|| format!("parsing {path}"))?
        }
        None => MixtureParams::default(),
    };
    if let Some(av) = args.av {
        p.av = av;
    }
    if args.rv.is_some() {
        p.rv = args.rv;
    }
    if args.rv_a.is_some() {
        p.rv_a = args.rv_a;
    }
    if args.rv_b.is_some() {
        p.rv_b = args.rv_b;
    }
    if let Some(f_a) = args.f_a {
        p.f_a = Some(f_a);
    }
    if args.tau {
        p.output = Output::Tau;
    }
    Ok(p)
}

fn validate_inputs(args: &Args) -> Result<()> {
    if !args.x_min.is_finite() || args.x_min <= 0.0 {
        return Err(anyhow!("x_min must be finite and > 0 (got {})", args.x_min));
    }
    if !args.x_step.is_finite() || args.x_step <= 0.0 {
        return Err(anyhow!("x_step must be finite and > 0 (got {})", args.x_step));
    }
    if let Some(v) = args.rv_sweep.iter().find(|v| !v.is_finite() || **v <= 0.0) {
        return Err(anyhow!("rv_sweep values must be finite and > 0 (got {})", v));
    }
    if let Some(v) = args.f_a_sweep.iter().find(|v| !v.is_finite()) {
        return Err(anyhow!("f_a_sweep values must be finite (got {})", v));
    }
    if !(args.x_max > args.x_min) {
        return Err(anyhow!(
            "require x_max > x_min; got x_max={} ≤ x_min={}",
            args.x_max,
            args.x_min
        ));
    }
    Ok(())
}

/// x_min, x_min + step, ... strictly below x_max.
fn wavenumber_grid(x_min: f64, x_max: f64, step: f64) -> Vec<f64> {
    let n = ((x_max - x_min) / step - 1e-9).ceil().max(0.0) as usize;
    (0..n).map(|i| x_min + i as f64 * step).collect()
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    validate_inputs(&args)?;
    let params = load_params(&args)?;
    let xs = wavenumber_grid(args.x_min, args.x_max, args.x_step);

    create_dir_all(&args.out_dir)?;

    let single = LawParams { av: params.av, rv: params.rv, output: params.output };
    match args.law.as_str() {
        "cardelli" => run_single(&args, &Cardelli::new(), &single, &xs),
        "calzetti" => {
            let support = (1.0 / Calzetti::MAX_UM)..=(1.0 / Calzetti::MIN_UM);
            let xs: Vec<f64> = xs.iter().copied().filter(|x| support.contains(x)).collect();
            tracing::info!(points = xs.len(), "grid clipped to the Calzetti support");
            run_single(&args, &Calzetti::new(), &single, &xs)
        }
        "f99" => run_single(&args, &Fitzpatrick99::new(), &single, &xs),
        "gordon" => run_single(&args, &Gordon03SmcBar::new(), &single, &xs),
        "mixture" => {
            let mix = Fitzpatrick99::new() + Gordon03SmcBar::new();
            if args.f_a_sweep.is_empty() {
                run_mixture(&args, &mix, &params, &xs)
            } else {
                run_f_a_sweep(&args, &mix, &params, &xs)
            }
        }
        "all" => run_comparison(&args, &single, &xs),
        m => Err(anyhow!("unknown law: {}", m)),
    }
}

fn run_single(args: &Args, law: &dyn ExtinctionLaw, params: &LawParams, xs: &[f64]) -> Result<()> {
    if args.rv_sweep.is_empty() {
        run_law(args, law, params, xs)
    } else {
        run_rv_sweep(args, law, params, xs)
    }
}

fn y_label(output: Output) -> &'static str {
    match output {
        Output::Alambda => "A(lambda) / A(V)",
        Output::Tau => "tau(lambda)",
    }
}

fn run_law(args: &Args, law: &dyn ExtinctionLaw, params: &LawParams, xs: &[f64]) -> Result<()> {
    if xs.is_empty() {
        return Err(anyhow!("{}: no grid point inside the law's support", law.name()));
    }
    let lamb = angstrom_from_wavenumber(xs);
    let values = law
        .function(&lamb, params)
        .with_context(|| format!("evaluating {}", law.name()))?;

    if args.verbose {
        let rep = verify_law(law, &lamb, params)?;
        println!(
            "[{}] points={} finite={} max_rel_err(tau)={:.3e}",
            rep.law, rep.points, rep.finite_ok, rep.rel_err_tau
        );
        if let Some((l, v)) = rep.peak {
            println!("  Peak A(lambda) = {:.4} at {:.1} AA (x = {:.3} 1/um)", v, l, 1.0e4 / l);
        }
        println!("  Valid parameters: {}", law.is_valid(params));
    }

    let header = vec![
        format!("# Law: {}", law.name()),
        format!("# Av={}, Rv={}", params.av, fmt_opt(params.rv)),
        format!("# Output: {:?}", params.output),
    ];
    write_curve_csv(&args.out_dir, &header, xs, &lamb, &values)?;
    if args.draw {
        let series = [Series { label: law.name().to_string(), points: zip_points(xs, &values) }];
        plot_curves(&series, y_label(params.output), &format!("{}/extinction.png", &args.out_dir))?;
    }
    Ok(())
}

fn run_mixture(
    args: &Args,
    mix: &MixtureLaw<Fitzpatrick99, Gordon03SmcBar>,
    params: &MixtureParams,
    xs: &[f64],
) -> Result<()> {
    let lamb = angstrom_from_wavenumber(xs);
    let ResolvedRv { rv, rv_a, rv_b, f_a } = mix.resolve(params)?;
    if !mix.is_valid_mixture(params) {
        tracing::warn!(rv, rv_a, rv_b, f_a, "mixture parameters outside the validity domain");
    }
    let values = mix.function_mixture(&lamb, params)?;

    if args.verbose {
        println!(
            "[{}] f_A={} Rv={:.4} Rv_A={:.4} Rv_B={:.4}",
            mix.name(),
            f_a,
            rv,
            rv_a,
            rv_b
        );
        println!("  Valid parameters: {}", mix.is_valid_mixture(params));
    }

    let header = vec![
        format!("# Law: {}", mix.name()),
        format!("# Av={}, f_A={}", params.av, f_a),
        format!("# Rv={}, Rv_A={}, Rv_B={}", rv, rv_a, rv_b),
        format!("# Output: {:?}", params.output),
    ];
    write_curve_csv(&args.out_dir, &header, xs, &lamb, &values)?;
    if args.draw {
        let label = format!("f_A={:.2}", f_a);
        let series = [Series { label, points: zip_points(xs, &values) }];
        plot_curves(&series, y_label(params.output), &format!("{}/extinction.png", &args.out_dir))?;
    }
    Ok(())
}

fn run_comparison(args: &Args, params: &LawParams, xs: &[f64]) -> Result<()> {
    let laws: [Box<dyn ExtinctionLaw>; 3] = [
        Box::new(Cardelli::new()),
        Box::new(Fitzpatrick99::new()),
        Box::new(Gordon03SmcBar::new()),
    ];
    let lamb = angstrom_from_wavenumber(xs);
    let mut columns = Vec::with_capacity(laws.len());
    for law in &laws {
        let values = law
            .function(&lamb, params)
            .with_context(|| format!("evaluating {}", law.name()))?;
        columns.push((law.name().to_string(), values));
    }
    write_table(args, "comparison", y_label(params.output), xs, &lamb, &columns)
}

/// One curve per R(V) of `--rv-sweep`.
fn run_rv_sweep(
    args: &Args,
    law: &dyn ExtinctionLaw,
    params: &LawParams,
    xs: &[f64],
) -> Result<()> {
    if xs.is_empty() {
        return Err(anyhow!("{}: no grid point inside the law's support", law.name()));
    }
    let lamb = angstrom_from_wavenumber(xs);
    let mut columns = Vec::with_capacity(args.rv_sweep.len());
    for rv in &args.rv_sweep {
        let values = law
            .function(&lamb, &LawParams { rv: Some(*rv), ..*params })
            .with_context(|| format!("evaluating {} at Rv={}", law.name(), rv))?;
        columns.push((format!("Rv={:.2}", rv), values));
    }
    tracing::info!(law = law.name(), curves = columns.len(), "R(V) sweep");
    write_table(args, "rv_sweep", y_label(params.output), xs, &lamb, &columns)
}

/// One curve per f_A of `--f-a-sweep`, all sharing the R(V) inputs.
fn run_f_a_sweep(
    args: &Args,
    mix: &MixtureLaw<Fitzpatrick99, Gordon03SmcBar>,
    params: &MixtureParams,
    xs: &[f64],
) -> Result<()> {
    let lamb = angstrom_from_wavenumber(xs);
    let mut columns = Vec::with_capacity(args.f_a_sweep.len());
    for f_a in &args.f_a_sweep {
        let p = MixtureParams { f_a: Some(*f_a), ..*params };
        if !mix.is_valid_mixture(&p) {
            tracing::warn!(f_a, "mixture parameters outside the validity domain");
        }
        let values = mix
            .function_mixture(&lamb, &p)
            .with_context(|| format!("evaluating {} at f_A={}", mix.name(), f_a))?;
        columns.push((format!("f_A={:.2}", f_a), values));
    }
    tracing::info!(mixture = mix.name(), curves = columns.len(), "f_A sweep");
    write_table(args, "f_a_sweep", y_label(params.output), xs, &lamb, &columns)
}

/// Writes `<stem>.csv` with one column per curve, and `<stem>.png` unless disabled.
fn write_table(
    args: &Args,
    stem: &str,
    y_label: &str,
    xs: &[f64],
    lamb: &[f64],
    columns: &[(String, Vec<f64>)],
) -> Result<()> {
    let file_path = format!("{}/{}.csv", args.out_dir, stem);
    let mut wtr = csv::Writer::from_writer(File::create(&file_path)?);
    let mut head = vec!["x".to_string(), "lambda_aa".to_string()];
    head.extend(columns.iter().map(|(label, _)| label.clone()));
    wtr.write_record(&head)?;
    for (i, (x, l)) in xs.iter().zip(lamb).enumerate() {
        let mut rec = vec![x.to_string(), l.to_string()];
        rec.extend(columns.iter().map(|(_, c)| c[i].to_string()));
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;

    if args.draw {
        let series: Vec<Series> = columns
            .iter()
            .map(|(label, c)| Series { label: label.clone(), points: zip_points(xs, c) })
            .collect();
        plot_curves(&series, y_label, &format!("{}/{}.png", args.out_dir, stem))?;
    }
    Ok(())
}

fn zip_points(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    xs.iter().copied().zip(ys.iter().copied()).collect()
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "default".to_string())
}

fn write_curve_csv(
    out_dir: &str,
    header: &[String],
    xs: &[f64],
    lamb: &[f64],
    values: &[f64],
) -> Result<()> {
    let file_path = format!("{}/extinction.csv", out_dir);
    let mut file = File::create(&file_path)?;

    for line in header {
        writeln!(file, "{}", line)?;
    }
    writeln!(file)?;

    let mut wtr = csv::Writer::from_writer(file);
    for ((x, l), v) in xs.iter().zip(lamb).zip(values) {
        wtr.serialize(Row { x: *x, lambda_aa: *l, value: *v })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_has_99_points() {
        let xs = wavenumber_grid(0.1, 10.0, 0.1);
        assert_eq!(xs.len(), 99);
        assert!((xs[98] - 9.9).abs() < 1e-9);
    }
}
