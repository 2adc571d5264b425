// TypeScript-looking source file with randomized identifiers.

use rand::Rng;

use crate::stamp::Stamp;

/// Render the source fixture. Identifiers are suffixed with four-digit
/// numbers so repeated passes never produce byte-identical files.
pub fn render<R: Rng + ?Sized>(rng: &mut R, stamp: &Stamp) -> String {
    let iso = stamp.iso();
    let interface_id: u32 = rng.gen_range(1000..=9999);
    let function_id: u32 = rng.gen_range(1000..=9999);
    let comment: u32 = rng.gen_range(1..=1_000_000);

    format!(
        "
// Auto-generated test file: {iso}
export interface TestInterface_{interface_id} {{
  id: string;
  timestamp: number;
  data: any;
}}

export const testFunction_{function_id} = () => {{
  console.log('Test function called at: {iso}');
  return Math.random();
}};

// Random comment: {comment}
"
    )
}

/// `test_file_<unix-secs>.ts`
pub fn file_name(stamp: &Stamp) -> String {
    format!("test_file_{}.ts", stamp.unix_secs())
}
