//! Party name clean-up for display.

/// Known truncated party names in the source data and their full form.
///
/// Matched against the raw, upper-case label before title-casing.
pub const NAME_CORRECTIONS: &[(&str, &str)] = &[(
    "SOUTH AFRICAN MAINTANANCE AND ESTATE BENEFICIARIES ASSOCIATI",
    "SOUTH AFRICAN MAINTANANCE AND ESTATE BENEFICIARIES ASSOCIATION",
)];

/// Produce the display name for a raw party label.
pub fn normalize(raw_label: &str) -> String {
    let corrected = apply_corrections(raw_label, NAME_CORRECTIONS);
    title_case(&corrected).replace("'S", "'s")
}

/// Replace truncated fragments with their corrected form.
///
/// A label that already contains the corrected form is left alone, since
/// the truncated fragment is a prefix of it.
pub fn apply_corrections(label: &str, corrections: &[(&str, &str)]) -> String {
    let mut label = label.to_string();
    for (truncated, corrected) in corrections {
        if label.contains(truncated) && !label.contains(corrected) {
            label = label.replace(truncated, corrected);
        }
    }
    label
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// A word starts at any letter that does not follow another letter, so
/// `"o'brien-smith"` becomes `"O'Brien-Smith"`. Letters whose uppercase
/// form is several characters (`ß`, `ﬁ`) keep only the first one upper,
/// giving `"Ss"` and `"Fi"`. Word boundaries are judged on the output, so
/// running the function twice changes nothing.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for c in s.chars() {
        if !c.is_alphabetic() {
            out.push(c);
        } else if ends_in_letter(&out) {
            out.extend(c.to_lowercase());
        } else {
            let mut upper = c.to_uppercase();
            out.extend(upper.next());
            for rest in upper {
                if ends_in_letter(&out) {
                    out.extend(rest.to_lowercase());
                } else {
                    out.push(rest);
                }
            }
        }
    }

    out
}

fn ends_in_letter(s: &str) -> bool {
    s.chars().next_back().is_some_and(char::is_alphabetic)
}
