//! # Docket CLI
//!
//! Usage:
//!   docket records.json -o rfq.pdf
//!   docket records.json --config invoice.json
//!   echo '{ ... }' | docket --data-uri
//!   docket --example > records.json
//!
//! Without `-o` the suggested filename is used. Set `RUST_LOG=debug` to see
//! pagination decisions.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_records_json());
        return;
    }

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    };
    let input = input.unwrap_or_else(|e| fail(&format!("Failed to read input: {}", e)));

    let config = flag_value(&args, "--config").map(|path| {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fail(&format!("Failed to read config {}: {}", path, e)))
    });

    let document = match docket::generate_json(&input, config.as_deref()) {
        Ok(doc) => doc,
        Err(e) => fail(&format!("Failed to generate document: {}", e)),
    };

    if args.iter().any(|a| a == "--data-uri") {
        println!("{}", document.to_data_uri());
        return;
    }

    let output_path = flag_value(&args, "-o")
        .cloned()
        .unwrap_or_else(|| document.filename.clone());
    if let Err(e) = fs::write(&output_path, &document.bytes) {
        fail(&format!("Failed to write {}: {}", output_path, e));
    }
    eprintln!(
        "✓ Written {} pages ({} bytes) to {}",
        document.page_count,
        document.bytes.len(),
        output_path
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| &w[1])
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}

fn example_records_json() -> &'static str {
    r##"{
  "meta": {
    "number": "RFQ20240092",
    "date": "2024-02-01",
    "dueDate": "2024-02-08"
  },
  "company": {
    "name": "Aalam Info Solutions LLP",
    "addressLines": ["Head Office", "No. 12, Anna Salai", "CHENNAI"],
    "postalCode": "600002",
    "contactPerson": "Nithish Kumar CP",
    "phone": "9078382732",
    "email": "purchase@aalam.example"
  },
  "vendor": {
    "name": "Velavan B",
    "addressLines": ["14/203, Kallakulam, Seenapuram", "Erode"],
    "postalCode": "638057",
    "contactPerson": "Santhosh D",
    "phone": "8993298712"
  },
  "lineItems": [
    { "name": "Water Tanks", "quantity": 15, "uom": "Liters", "unitPrice": 1200 },
    { "name": "Bookshelves", "quantity": "2", "uom": "Units", "unitPrice": "5,000" }
  ]
}
"##
}
