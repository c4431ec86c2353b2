use std::fmt;

pub struct RenderNode<F>(pub F);
impl<F> fmt::Display for RenderNode<F>
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(f)
    }
}

/// Text content, escaped for use between tags or inside a double-quoted attribute.
pub struct Text<'a>(pub &'a str);
impl fmt::Display for Text<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(i) = rest.find(['&', '<', '>', '"']) {
            f.write_str(&rest[..i])?;
            f.write_str(match rest.as_bytes()[i] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                _ => "&quot;",
            })?;
            rest = &rest[i + 1..];
        }
        f.write_str(rest)
    }
}

/// Something that can be written as an attribute. `None` writes nothing.
pub trait AttrValue {
    fn write_attr(&self, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl AttrValue for &str {
    fn write_attr(&self, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#" {name}="{}""#, Text(self))
    }
}

impl AttrValue for String {
    fn write_attr(&self, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().write_attr(name, f)
    }
}

impl<T: AttrValue> AttrValue for Option<T> {
    fn write_attr(&self, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(value) => value.write_attr(name, f),
            None => Ok(()),
        }
    }
}

#[macro_export]
macro_rules! node {
    ($kind:ident $(, $attr:ident = $val:expr )* => $($child:expr),+ $(,)?) => {
        $crate::macros::RenderNode(|f: &mut std::fmt::Formatter<'_>| {
            write!(f, "<{}", stringify!($kind))?;
            $($crate::macros::AttrValue::write_attr(&$val, stringify!($attr), f)?;)*
            write!(f, ">")?;
            $(write!(f, "{}", $child)?;)+
            write!(f, "</{}>", stringify!($kind))
        })
    };

    ($kind:ident $(, $attr:ident = $val:expr )* $(,)?) => {
        $crate::macros::RenderNode(|f: &mut std::fmt::Formatter<'_>| {
            write!(f, "<{}", stringify!($kind))?;
            $($crate::macros::AttrValue::write_attr(&$val, stringify!($attr), f)?;)*
            write!(f, " />")
        })
    };
}

#[macro_export]
macro_rules! group_nodes {
    ($lnode:expr $(, $rnode:expr )+) => {
        $crate::macros::RenderNode(|f: &mut std::fmt::Formatter<'_>| {
            write!(f, "{}", $lnode)?;
            $(write!(f, "{}", $rnode)?;)+
            Ok(())
        })
    }
}
