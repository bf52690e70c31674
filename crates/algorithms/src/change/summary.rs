//! Change matrix reporting

use crate::area::AreaTable;
use crate::change::TransitionCodebook;
use std::fmt;

/// Cross-tabulation of change areas: from-class rows, to-class columns, km².
///
/// Built from a per-transition [`AreaTable`] (the aggregation of a transition
/// raster). The diagonal is persistence; off-diagonal cells are substitution
/// between classes.
#[derive(Debug, Clone)]
pub struct ChangeMatrix {
    classes: Vec<i32>,
    /// Row-major n×n areas in km²
    areas: Vec<f64>,
}

impl ChangeMatrix {
    /// Build the matrix from per-transition-code areas.
    ///
    /// Entries whose code does not decode under the codebook (e.g. the
    /// no-data label) are ignored.
    pub fn from_areas(table: &AreaTable, codebook: &TransitionCodebook) -> Self {
        let n = codebook.num_classes();
        let mut areas = vec![0.0; n * n];

        for (code, km2) in table.iter() {
            if codebook.decode(code).is_some() {
                areas[code as usize] += km2;
            }
        }

        Self {
            classes: codebook.classes().to_vec(),
            areas,
        }
    }

    /// The class labels, in codebook order
    pub fn classes(&self) -> &[i32] {
        &self.classes
    }

    /// Area in km² that moved from one class to another (or stayed, if equal)
    pub fn area(&self, from: i32, to: i32) -> f64 {
        let n = self.classes.len();
        match (self.class_index(from), self.class_index(to)) {
            (Some(i), Some(j)) => self.areas[n * i + j],
            _ => 0.0,
        }
    }

    /// Area that became `class` coming from a different class
    pub fn gain(&self, class: i32) -> f64 {
        self.classes
            .iter()
            .filter(|&&from| from != class)
            .map(|&from| self.area(from, class))
            .sum()
    }

    /// Area that left `class` for a different class
    pub fn loss(&self, class: i32) -> f64 {
        self.classes
            .iter()
            .filter(|&&to| to != class)
            .map(|&to| self.area(class, to))
            .sum()
    }

    /// Net change of `class` in km² (gain minus loss)
    pub fn net(&self, class: i32) -> f64 {
        self.gain(class) - self.loss(class)
    }

    /// Area that stayed in `class`
    pub fn persistence(&self, class: i32) -> f64 {
        self.area(class, class)
    }

    /// Total area covered by the matrix in km²
    pub fn total(&self) -> f64 {
        self.areas.iter().sum()
    }

    fn class_index(&self, class: i32) -> Option<usize> {
        self.classes.iter().position(|&c| c == class)
    }
}

impl fmt::Display for ChangeMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "from\\to")?;
        for &to in &self.classes {
            write!(f, " {:>12}", to)?;
        }
        writeln!(f, " {:>12} {:>12}", "loss", "net")?;

        for &from in &self.classes {
            write!(f, "{:>10}", from)?;
            for &to in &self.classes {
                write!(f, " {:>12.6}", self.area(from, to))?;
            }
            writeln!(f, " {:>12.6} {:>+12.6}", self.loss(from), self.net(from))?;
        }

        write!(f, "{:>10}", "gain")?;
        for &to in &self.classes {
            write!(f, " {:>12.6}", self.gain(to))?;
        }
        writeln!(f)?;
        writeln!(f, "total: {:.6} km²", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// classes [0,1]; 1.0 km² stayed 0, 0.5 km² went 0→1, 0.25 km² went 1→0
    fn sample() -> ChangeMatrix {
        let cb = TransitionCodebook::new(&[0, 1]).unwrap();
        let mut table = AreaTable::new();
        table.add(cb.code(0, 0).unwrap(), 1.0);
        table.add(cb.code(0, 1).unwrap(), 0.5);
        table.add(cb.code(1, 0).unwrap(), 0.25);
        ChangeMatrix::from_areas(&table, &cb)
    }

    #[test]
    fn test_cells() {
        let m = sample();
        assert_relative_eq!(m.area(0, 0), 1.0);
        assert_relative_eq!(m.area(0, 1), 0.5);
        assert_relative_eq!(m.area(1, 0), 0.25);
        assert_relative_eq!(m.area(1, 1), 0.0);
        assert_relative_eq!(m.area(7, 0), 0.0);
    }

    #[test]
    fn test_gains_losses_net() {
        let m = sample();
        assert_relative_eq!(m.gain(1), 0.5);
        assert_relative_eq!(m.loss(1), 0.25);
        assert_relative_eq!(m.net(1), 0.25);
        assert_relative_eq!(m.net(0), -0.25);
        assert_relative_eq!(m.persistence(0), 1.0);
        assert_relative_eq!(m.total(), 1.75);
    }

    #[test]
    fn test_ignores_undecodable_codes() {
        let cb = TransitionCodebook::new(&[0, 1]).unwrap();
        let mut table = AreaTable::new();
        table.add(0, 1.0);
        table.add(99, 5.0); // outside [0, 4)
        let m = ChangeMatrix::from_areas(&table, &cb);
        assert_relative_eq!(m.total(), 1.0);
    }

    #[test]
    fn test_display_renders() {
        let text = sample().to_string();
        assert!(text.contains("total: 1.750000"));
        assert!(text.contains("gain"));
    }
}
