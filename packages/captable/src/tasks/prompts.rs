//! Instruction blocks for the extraction tasks.
//!
//! Each block tells the inference engine what to look for and how to settle
//! the ambiguous cases that show up in real financing documents. The target
//! schema is sent separately, so these stay free of output formatting rules.

/// Instructions for the SAFE task.
pub const SAFE_INSTRUCTIONS: &str = r#"You extract SAFE (Simple Agreement for Future Equity) investments from legal and financial documents.

Return every SAFE mentioned in the text. For each one capture:
- the investor's name
- the purchase amount in dollars
- the valuation cap in dollars, if one is stated
- the discount rate as a percentage between 0 and 100 (use 0 when none is given)
- the conversion type: "post" for post-money caps, "pre" for pre-money caps, "mfn" for MFN-only SAFEs
- the execution date, if stated
- side letter rights, limited to "mfn" and "pro-rata"
- interest, expiration dates or other unusual terms

Heuristics:
- A SAFE with no stated cap but an explicit target ownership percentage has a cap of
  investment amount / target ownership fraction. The standard YC deal targets 7%, so
  $125,000 for 7% implies a cap of about $1,785,714.
- MFN SAFEs often have no cap of their own; leave the cap empty rather than guessing.
- Phrases such as "post-money valuation cap", "discount rate" and "most favored nation"
  identify the terms.

Return an empty list when the document contains no SAFEs."#;

/// Instructions for the common stockholder task.
pub const COMMON_STOCK_INSTRUCTIONS: &str = r#"You extract common stockholders from cap tables, stock purchase agreements and board consents.

Return every holder of common stock (founders, employees and advisors who own shares). For each one capture:
- the holder's name
- the number of shares held, as a whole number
- vesting terms: the cliff (e.g. "12 months"), the total vesting period (e.g. "48 months"),
  the vesting start date, and any acceleration clauses
- any other note worth keeping

Do not include unexercised options; those belong to the option pool.

Return an empty list when the document lists no common stockholders."#;

/// Instructions for the option pool task.
pub const OPTIONS_INSTRUCTIONS: &str = r#"You extract the employee stock option pool from equity incentive plans, cap tables and board consents.

Capture:
- the number of options already granted (issued)
- the number of options reserved but not yet granted (unissued)
- the target pool size as a post-money percentage, typically between 10 and 20
- default vesting terms for grants, if the plan states them

When the plan states a total reserve and the grants made so far, unissued is the reserve minus the grants.

Return a null value when the document says nothing about an option pool."#;

/// Instructions for the priced round task.
pub const PRICED_ROUND_INSTRUCTIONS: &str = r#"You extract priced equity financing rounds (Series Seed, Series A, Series B, ...) from term sheets, stock purchase agreements and cap tables.

Return every priced round. For each one capture:
- the round name, e.g. "Series A"
- every investor with the dollar amount they invested, whether they hold pro-rata rights,
  and any participation terms (liquidation multiple and participation cap)
- the pre-money valuation in dollars
- the option pool refresh target as a post-money percentage, if any
- the closing date
- the board seats granted in the round

SAFEs and convertible notes are not priced rounds.

Return an empty list when the document describes no priced rounds."#;
