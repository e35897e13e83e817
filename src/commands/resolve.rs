use crate::page_range::parse_page_spec;
use anyhow::Result;

pub fn run(pages: &str, max_page: u32) -> Result<()> {
    let selected = parse_page_spec(pages, max_page)?;
    println!("{}", selected);
    println!("{} of {} page(s) selected", selected.len(), max_page);
    Ok(())
}
