//! The `evalform init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("evalform.toml").exists() {
        println!("evalform.toml already exists, skipping.");
    } else {
        std::fs::write("evalform.toml", SAMPLE_CONFIG)?;
        println!("Created evalform.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit evalform.toml with your jsonbin key and bin ids");
    println!("  2. Run: evalform login --name \"Your Name\"");
    println!("  3. Run: evalform list");
    println!("  4. Run: evalform fill --id <ID>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# evalform configuration

base_url = "https://api.jsonbin.io"
master_key = "${JSONBIN_MASTER_KEY}"

# Bin holding a JSON array of evaluations:
# [{"id": 1, "title": "...", "questions": [{"id": 1, "label": "...", "type": "text"}]}]
evaluations_bin = ""

# Bin holding a JSON array of answer records (start it as [])
answers_bin = ""

timeout_secs = 30
state_file = "./evalform-state.json"
"#;
