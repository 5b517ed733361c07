use clap::{Args, Parser, Subcommand};
use orbit_layout::{GroupId, LayoutOptions, Point, SortMode};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "orbit", version, about = "Radial orbit layouts for grouped, weighted data")]
pub struct Cli {
    /// Config file layered over the user config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the resolved render plan as JSON
    Plan {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Draw the scene to an .svg or .png file
    Render {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        output: PathBuf,

        /// Hover whatever lies under X,Y
        #[arg(long, value_parser = parse_point)]
        pointer: Option<Point>,

        /// Also click at the pointer position
        #[arg(long, requires = "pointer")]
        click: bool,

        /// Select a dial tick (0 is at the top)
        #[arg(long)]
        dial: Option<usize>,

        /// Seconds since load; PNG output applies rotation and fade-in at
        /// this time
        #[arg(long)]
        at: Option<f64>,

        /// Re-render when the dataset or config changes
        #[arg(long)]
        watch: bool,
    },
    /// Write the default config file and print its path
    Init,
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Dataset JSON; the bundled demo is used when omitted
    pub dataset: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<f64>,

    #[arg(long)]
    pub height: Option<f64>,

    /// none, value or label
    #[arg(long)]
    pub sort: Option<SortMode>,

    /// Confine each orbit to its own angular sector
    #[arg(long)]
    pub group_by: bool,

    /// Orbit buckets, e.g. "finance,company-stack;shadow-it"
    #[arg(long)]
    pub orbits: Option<OrbitBuckets>,
}

impl InputArgs {
    /// Applies the flags given on the command line over `base`.
    pub fn layout(&self, base: &LayoutOptions) -> LayoutOptions {
        let mut options = base.clone();
        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(height) = self.height {
            options.height = height;
        }
        if let Some(sort) = &self.sort {
            options.sort = sort.clone();
        }
        if self.group_by {
            options.group_by = true;
        }
        if let Some(OrbitBuckets(buckets)) = &self.orbits {
            options.orbit_assignment = Some(buckets.clone());
        }
        options
    }
}

/// `;` separates orbits, `,` separates the groups sharing one.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitBuckets(pub Vec<Vec<GroupId>>);

impl FromStr for OrbitBuckets {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let buckets: Vec<Vec<GroupId>> = s
            .split(';')
            .map(|bucket| {
                bucket
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(GroupId::from)
                    .collect()
            })
            .collect();
        if buckets.iter().all(Vec::is_empty) {
            return Err(format!("no group ids in '{s}'"));
        }
        Ok(Self(buckets))
    }
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{v}': {e}"))
    };
    Ok(Point::new(coord(x)?, coord(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_buckets_parsing() {
        let cases = vec![
            ("a,b;c", vec![vec!["a", "b"], vec!["c"]]),
            (" a , b ", vec![vec!["a", "b"]]),
            ("a;;b", vec![vec!["a"], vec![], vec!["b"]]),
        ];

        for (input, expected) in cases {
            let OrbitBuckets(buckets) = input.parse().unwrap();
            let ids: Vec<Vec<&str>> = buckets
                .iter()
                .map(|b| b.iter().map(GroupId::as_str).collect())
                .collect();
            assert_eq!(ids, expected);
        }
        assert!(";".parse::<OrbitBuckets>().is_err());
    }

    #[test]
    fn test_point_parsing() {
        assert_eq!(parse_point("10, 20.5"), Ok(Point::new(10.0, 20.5)));
        assert!(parse_point("10").is_err());
        assert!(parse_point("x,1").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "orbit", "render", "data.json", "-o", "out.svg", "--width", "400", "--sort", "label",
            "--orbits", "a;b", "--pointer", "5,5", "--click",
        ]);
        let Command::Render {
            input,
            pointer,
            click,
            ..
        } = cli.command
        else {
            panic!("expected render");
        };

        let options = input.layout(&LayoutOptions::default());
        assert_eq!(options.width, 400.0);
        assert_eq!(options.height, 800.0);
        assert_eq!(options.sort, SortMode::Label);
        assert_eq!(options.assignment().map(<[_]>::len), Some(2));
        assert_eq!(pointer, Some(Point::new(5.0, 5.0)));
        assert!(click);
    }
}
