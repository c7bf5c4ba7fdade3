use std::error::Error;
use parcalc::{Calculator, Conf, ExplCalculator, Logger, SymCalculator, Value};

fn fill<C: Calculator>(
    calc: &mut C,
    rows: &[&[f64]],
) -> Result<parcalc::CsId, Box<dyn Error>> {
    let set = calc.new_confset();

    for row in rows {
        calc.add(set, Conf::from_reals(row.iter().copied()))?;
    }

    Ok(set)
}

/// Pairs video sources with televisions: a source delivers a signal
/// quality, a television requires one, and a source satisfies a
/// television iff the required quality dominates the reciprocal of
/// the delivered one.
fn run<C: Calculator>(calc: &mut C, label: &str) -> Result<(), Box<dyn Error>> {
    log::info!("Running the {} calculator", label);

    let v = fill(calc, &[&[1.0, 0.8], &[3.0, 0.5], &[5.0, 0.4], &[8.0, 0.3]])?;
    let h = fill(calc, &[&[2.0, 0.8], &[4.0, 0.4], &[6.0, 0.2], &[8.0, 0.1]])?;

    calc.identical_quantities(h, 1, v, 1)?;

    println!("P:\n{}", calc.render(h)?);
    println!("C:\n{}", calc.render(v)?);

    let prod = calc.multiply(h, v)?;
    println!("P x C:\n{}", calc.render(prod)?);

    let pc = calc.prodcons(h, 1, v, 0, &|val| Value::Real(1.0 / val.as_f64()))?;
    println!("prodcons(P, 1, C, 0, x -> 1/x):\n{}", calc.render(pc)?);

    let ja = calc.join_and_abstract(h, 1, v, 1)?;
    println!("joinAndAbstract(P, 1, C, 1):\n{}", calc.render(ja)?);

    calc.minimise(pc)?;
    println!("min(prodcons):\n{}", calc.render(pc)?);

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    Logger::new("parcalc-demo").with_console(log::LevelFilter::Info).apply();

    run(&mut ExplCalculator::new(), "explicit")?;
    run(&mut SymCalculator::new(), "symbolic")?;

    Ok(())
}
