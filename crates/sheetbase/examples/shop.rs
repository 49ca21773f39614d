//! Example: Create a workbook, fill a table and save it

use sheetbase::prelude::*;

fn main() -> Result<()> {
    let config = StorageConfig::new(std::env::temp_dir().join("sheetbase-example"));

    // Create shop.xlsx with an empty "Main" sheet
    Creator::new(config.clone()).create("shop")?;

    let mut db = Loader::new(config.clone()).load("shop.xlsx")?;
    {
        let mut editor = db.editor("Main")?;
        for (name, default) in [("Name", Value::Empty), ("Price", Value::from(0.0))] {
            if let Outcome::Refused(reason) = editor.add_column(name, default)? {
                println!("skipped: {}", reason);
            }
        }

        editor.add_row(Row::new().with("ID", 1).with("Name", "apple").with("Price", 0.5))?;
        editor.add_row(Row::new().with("ID", 2).with("Name", "pear").with("Price", 0.75))?;
        editor.update_row(1, "Price", 0.8)?;
        editor.save()?;
    }

    println!("{}", db.reader().preview("Main", 10)?);

    // Keep a copy next to the original
    let copy = Persister::new(config).save(&db, Some("shop-copy.xlsx"))?;
    println!("copy written to {}", copy.display());

    Ok(())
}
