use std::io;

use telcoprefix::CarrierDetector;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let numbers = std::env::args().skip(1).collect::<Vec<_>>();
    if numbers.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "usage: lookup <number>... (e.g. lookup +2348031234567)",
        )
        .into());
    }

    let mut builder = CarrierDetector::builder();
    if let Ok(region) = std::env::var("TELCOPREFIX_REGION") {
        builder = builder.fallback_region(region);
    }
    let detector = builder.build()?;

    for number in numbers {
        match detector.detect(&number) {
            Ok(verdict) => println!("{}", serde_json::to_string(&verdict)?),
            Err(err) => eprintln!("{number}: {}", err.user_message()),
        }
    }

    Ok(())
}
