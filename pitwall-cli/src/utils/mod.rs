use std::fmt::Display;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::str::FromStr;

#[derive(Copy, Clone, Debug)]
pub struct Prompt<'a, T>
where
    T: FromStr,
    T::Err: Display,
{
    msg: &'a str,
    _marker: PhantomData<T>,
}

impl<'a, T> Prompt<'a, T>
where
    T: FromStr,
    T::Err: Display,
{
    #[inline]
    pub fn new(msg: &'a str) -> Self {
        Self {
            msg,
            _marker: PhantomData,
        }
    }

    pub fn read(&self) -> Result<T, T::Err> {
        T::from_str(&self.read_raw())
    }

    /// Read until a valid element is input.
    pub fn read_valid(&self) -> T {
        loop {
            match self.read() {
                Ok(val) => return val,
                Err(err) => {
                    println!("Failed to parse input: {}", err)
                }
            }
        }
    }

    /// Read until a valid element is input. An empty input returns
    /// `None`.
    pub fn read_optional(&self) -> Option<T> {
        loop {
            let raw = self.read_raw();
            if raw.is_empty() {
                return None;
            }

            match T::from_str(&raw) {
                Ok(val) => return Some(val),
                Err(err) => {
                    println!("Failed to parse input: {}", err)
                }
            }
        }
    }

    fn read_raw(&self) -> String {
        {
            let mut writer = io::stdout();
            writer.write_all(self.msg.as_bytes()).unwrap();
            writer.write_all(b": ").unwrap();
            writer.flush().unwrap();
        }

        let mut string = String::new();
        io::stdin()
            .read_line(&mut string)
            .expect("Failed to read from stdin");

        string.trim_end_matches(&['\r', '\n'][..]).to_owned()
    }
}
