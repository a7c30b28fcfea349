use nu_ansi_term::Color::{Cyan, Green, Red};

/// Print info on console.
pub(crate) fn info(message: &str) {
    println!("{}", Cyan.bold().italic().paint(message));
}

/// Print a labelled value on console.
pub(crate) fn entry(label: &str, value: &str) {
    println!("{} {}", Green.bold().paint(format!("{label}:")), value);
}

/// Print warning on console.
pub(crate) fn warn(message: &str, data: &str) {
    eprintln!(
        "{} \n {} ",
        Cyan.bold().italic().paint(message),
        Red.bold().italic().paint(data)
    );
}
