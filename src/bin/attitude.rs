use anyhow::Result;

#[cfg(feature = "cli")]
mod main {
    use super::*;
    use attitude::{AngleUnit, EulerSequence, Rotation, RotationConfig, ScalarPosition};
    use clap::{Args, Parser, Subcommand};
    use nalgebra::{Matrix3, Vector3};

    #[derive(Debug, Parser)]
    #[command(about = "Convert between and apply rotation representations", long_about = None)]
    struct Cli {
        #[command(subcommand)]
        command: Command,

        /// Largest accepted deviation of a matrix from a proper rotation matrix
        #[arg(long, global = true)]
        matrix_tolerance: Option<f64>,

        /// Distance in radians of the middle Euler angle from its singular
        /// value within which the decomposition is treated as gimbal locked
        #[arg(long, global = true)]
        gimbal_lock_threshold: Option<f64>,
    }

    #[derive(Debug, Subcommand)]
    enum Command {
        /// Print the quaternion and direction cosine matrix for Euler angles
        Euler {
            /// Intrinsic axis sequence
            #[arg(value_enum, ignore_case = true)]
            sequence: EulerSequence,

            /// The three angles, in sequence order
            #[arg(num_args = 3, allow_negative_numbers = true, value_names = ["A", "B", "C"])]
            angles: Vec<f64>,

            /// Interpret the angles as degrees instead of radians
            #[arg(long)]
            degrees: bool,
        },
        /// Print the normalized quaternion, direction cosine matrix and Euler
        /// angles for quaternion components
        Quaternion {
            /// The four quaternion components
            #[arg(num_args = 4, allow_negative_numbers = true, value_names = ["Q0", "Q1", "Q2", "Q3"])]
            components: Vec<f64>,

            #[command(flatten)]
            order: ComponentOrder,

            /// Sequence to decompose the rotation into
            #[arg(long, value_enum, ignore_case = true, default_value_t = EulerSequence::ZYX)]
            sequence: EulerSequence,

            /// Print the Euler angles in degrees instead of radians
            #[arg(long)]
            degrees: bool,
        },
        /// Print the quaternion for a direction cosine matrix given in
        /// row-major order
        Matrix {
            #[arg(
                num_args = 9,
                allow_negative_numbers = true,
                value_names = ["M00", "M01", "M02", "M10", "M11", "M12", "M20", "M21", "M22"]
            )]
            elements: Vec<f64>,
        },
        /// Rotate a vector by a quaternion
        Rotate {
            /// The four quaternion components followed by the three vector
            /// components
            #[arg(
                num_args = 7,
                allow_negative_numbers = true,
                value_names = ["Q0", "Q1", "Q2", "Q3", "X", "Y", "Z"]
            )]
            values: Vec<f64>,

            #[command(flatten)]
            order: ComponentOrder,
        },
        /// Print the angle between two rotations given as quaternions
        Difference {
            /// The four components of each of the two quaternions
            #[arg(
                num_args = 8,
                allow_negative_numbers = true,
                value_names = ["A0", "A1", "A2", "A3", "B0", "B1", "B2", "B3"]
            )]
            values: Vec<f64>,

            #[command(flatten)]
            order: ComponentOrder,

            /// Print the angle in degrees instead of radians
            #[arg(long)]
            degrees: bool,
        },
    }

    #[derive(Debug, Args)]
    struct ComponentOrder {
        /// Quaternion components are given as [qx, qy, qz, qs]
        #[arg(long)]
        scalar_last: bool,
    }

    impl Cli {
        fn config(&self) -> Result<RotationConfig> {
            let defaults = RotationConfig::default();
            let config = RotationConfig {
                matrix_tolerance: self.matrix_tolerance.unwrap_or(defaults.matrix_tolerance),
                gimbal_lock_threshold: self
                    .gimbal_lock_threshold
                    .unwrap_or(defaults.gimbal_lock_threshold),
                ..defaults
            };
            config.validate()?;
            Ok(config)
        }
    }

    impl ComponentOrder {
        fn scalar_position(&self) -> ScalarPosition {
            if self.scalar_last {
                ScalarPosition::Last
            } else {
                ScalarPosition::First
            }
        }
    }

    pub fn main() -> Result<()> {
        env_logger::init();

        let cli = Cli::parse();
        let config = cli.config()?;
        log::debug!("Using {config:?}");

        match cli.command {
            Command::Euler {
                sequence,
                angles,
                degrees,
            } => {
                let rotation =
                    Rotation::from_euler_angle_slice(&angles, sequence, angle_unit(degrees))?;
                print_quaternion(&rotation);
                print_matrix("DCM", &rotation.direction_cosine_matrix());
            }
            Command::Quaternion {
                components,
                order,
                sequence,
                degrees,
            } => {
                let rotation = Rotation::from_quaternion_with_config(
                    &components,
                    order.scalar_position(),
                    &config,
                )?;
                print_quaternion(&rotation);
                print_matrix("DCM", &rotation.direction_cosine_matrix());

                let units = angle_unit(degrees);
                let angles = rotation.euler_angles_with_config(sequence, &config);
                let [first, second, third] = angles.in_units(units);
                println!(
                    "{sequence} ({units}): {first:.9} {second:.9} {third:.9}{}",
                    if angles.is_gimbal_locked() {
                        " (gimbal locked)"
                    } else {
                        ""
                    }
                );
            }
            Command::Matrix { elements } => {
                let matrix = Matrix3::from_row_slice(&elements);
                let rotation = Rotation::from_direction_cosine_matrix_with_config(&matrix, &config)?;
                print_quaternion(&rotation);
            }
            Command::Rotate { values, order } => {
                let (components, vector) = values.split_at(4);
                let rotation = Rotation::from_quaternion_with_config(
                    components,
                    order.scalar_position(),
                    &config,
                )?;
                let rotated = rotation.rotate(&Vector3::from_column_slice(vector));
                println!("{:.9} {:.9} {:.9}", rotated.x, rotated.y, rotated.z);
            }
            Command::Difference {
                values,
                order,
                degrees,
            } => {
                let (a, b) = values.split_at(4);
                let a = Rotation::from_quaternion_with_config(a, order.scalar_position(), &config)?;
                let b = Rotation::from_quaternion_with_config(b, order.scalar_position(), &config)?;
                let units = angle_unit(degrees);
                println!(
                    "{:.9} {units}",
                    units.from_radians(a.angular_difference(&b))
                );
            }
        }
        Ok(())
    }

    fn angle_unit(degrees: bool) -> AngleUnit {
        if degrees {
            AngleUnit::Degrees
        } else {
            AngleUnit::Radians
        }
    }

    fn print_quaternion(rotation: &Rotation) {
        let [qs, qx, qy, qz] = rotation.quaternion(ScalarPosition::First);
        println!("q [qs qx qy qz]: {qs:.9} {qx:.9} {qy:.9} {qz:.9}");
    }

    fn print_matrix(label: &str, matrix: &Matrix3<f64>) {
        println!("{label}:");
        for row in matrix.row_iter() {
            println!("  {:12.9} {:12.9} {:12.9}", row[0], row[1], row[2]);
        }
    }
}

#[cfg(not(feature = "cli"))]
mod main {
    use super::*;

    pub fn main() -> Result<()> {
        anyhow::bail!("This binary requires the `cli` feature to be enabled.")
    }
}

fn main() -> Result<()> {
    main::main()
}
