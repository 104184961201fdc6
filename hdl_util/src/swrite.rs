pub trait StringMut {
    fn as_mut_string(&mut self) -> &mut String;
}

impl StringMut for String {
    fn as_mut_string(&mut self) -> &mut String {
        self
    }
}

impl<T: StringMut> StringMut for &mut T {
    fn as_mut_string(&mut self) -> &mut String {
        (*self).as_mut_string()
    }
}

/// Variant of write! that only works for strings, and doesn't return a spurious error.
#[macro_export]
macro_rules! swrite {
    ($dst:expr, $($arg:tt)*) => {{
        use std::fmt::Write;
        use $crate::swrite::StringMut;
        let dst = $dst.as_mut_string();
        write!(dst, $($arg)*).unwrap();
    }};
}

/// Variant of writeln! that only works for strings, and doesn't return a spurious error.
#[macro_export]
macro_rules! swriteln {
    ($dst:expr $(,)?) => {{
        use std::fmt::Write;
        use $crate::swrite::StringMut;
        let dst = $dst.as_mut_string();
        writeln!(dst).unwrap();
    }};
    ($dst:expr, $($arg:tt)*) => {{
        use std::fmt::Write;
        use $crate::swrite::StringMut;
        let dst = $dst.as_mut_string();
        writeln!(dst, $($arg)*).unwrap();
    }};
}

/// Write `depth` levels of indentation, two spaces each.
pub fn swrite_indent(dst: &mut impl StringMut, depth: usize) {
    let dst = dst.as_mut_string();
    for _ in 0..depth {
        dst.push_str("  ");
    }
}

#[cfg(test)]
mod test {
    use crate::swrite::swrite_indent;

    #[test]
    fn write_and_indent() {
        let mut s = String::new();
        swrite_indent(&mut s, 2);
        swrite!(s, "{}", 5);
        swriteln!(s);
        swriteln!(&mut s, "x = {}", "y");
        assert_eq!(s, "    5\nx = y\n");
    }
}
