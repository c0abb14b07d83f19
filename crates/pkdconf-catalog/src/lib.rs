//! Compiled-in parameter schema of the PKDGRAV3 N-body code.
//!
//! Every simulation option with its spelling, destination, value type, default
//! and help text. The schema is built on first use and shared for the life of
//! the process.

use std::f64::consts::PI;
use std::sync::OnceLock;

use pkdconf_core::{OptionDescriptor, ParamValue, Schema, SchemaBuilder, SchemaError, ValueType};

/// Name the engine uses for itself when no entry point replaces it.
pub const PROGRAM_NAME: &str = "pkdgrav3";
pub const DESCRIPTION: &str = "PKDGRAV3 n-body code";
/// Options of which at most one may appear on a command line.
pub const NORMALIZATION_SET: &str = "normalization";

/// Returns the shared simulation schema, building it on first call.
pub fn simulation_schema() -> Result<&'static Schema, SchemaError> {
    static SCHEMA: OnceLock<Result<Schema, SchemaError>> = OnceLock::new();
    SCHEMA
        .get_or_init(build_simulation_schema)
        .as_ref()
        .map_err(Clone::clone)
}

pub fn build_simulation_schema() -> Result<Schema, SchemaError> {
    let mut builder = SchemaBuilder::new(DESCRIPTION);
    builder.register_group("Gravity, Domains, Trees", gravity_domains_trees())?;
    builder.register_group("Analysis", analysis())?;
    builder.register_group("I/O Parameters", io_parameters())?;
    builder.register_group("Time Stepping", time_stepping())?;
    builder.register_group("Force Accuracy", force_accuracy())?;
    builder.register_group("Periodic Boundaries", periodic_boundaries())?;
    builder.register_group("Cosmology", cosmology())?;
    builder.register_group("Initial Conditions", initial_conditions())?;
    builder.register_group("Memory Model and Control", memory_model())?;
    builder.register_group("Gas Parameters", gas_parameters())?;
    builder.register_group("Debugging/Testing/Diagnostics", diagnostics())?;
    Ok(builder.build())
}

fn toggle(name: &str, destination: &str, default: bool, help: &str) -> OptionDescriptor {
    OptionDescriptor::toggle(name, destination, Some(default), help)
}

fn float(name: &str, destination: &str, default: f64, help: &str) -> OptionDescriptor {
    OptionDescriptor::scalar(name, destination, ValueType::Float, ParamValue::Float(default), help)
}

fn float_unset(name: &str, destination: &str, help: &str) -> OptionDescriptor {
    OptionDescriptor::scalar(name, destination, ValueType::Float, ParamValue::Unset, help)
}

fn int(name: &str, destination: &str, default: i64, help: &str) -> OptionDescriptor {
    OptionDescriptor::scalar(name, destination, ValueType::Int, ParamValue::Int(default), help)
}

fn int_unset(name: &str, destination: &str, help: &str) -> OptionDescriptor {
    OptionDescriptor::scalar(name, destination, ValueType::Int, ParamValue::Unset, help)
}

fn text(name: &str, destination: &str, default: &str, help: &str) -> OptionDescriptor {
    OptionDescriptor::scalar(name, destination, ValueType::Text, ParamValue::from(default), help)
}

fn text_unset(name: &str, destination: &str, help: &str) -> OptionDescriptor {
    OptionDescriptor::scalar(name, destination, ValueType::Text, ParamValue::Unset, help)
}

#[rustfmt::skip]
fn gravity_domains_trees() -> Vec<OptionDescriptor> {
    vec![
        float("e", "dSoft", 0.0, "gravitational softening length"),
        float("eMax", "dSoftMax", 0.0, "maximum comoving gravitational softening length (abs or multiplier)"),
        toggle("PhysSoft", "bPhysicalSoft", false, "Physical gravitational softening length"),
        toggle("SMM", "bSoftMaxMul", true, "Use maximum comoving gravitational softening length as a multiplier"),
        toggle("g", "bDoGravity", true, "enable interparticle gravity"),
        int("lingrid", "nGridLin", 0, "Grid size for linear species 0=disabled"),
        toggle("linpk", "bDoLinPkOutput", false, "enable power spectrum output for linear species"),
        toggle("2tree", "bDualTree", false, "enable second tree for active rungs"),
        float("fndt", "dFracDualTree", 0.05, "Fraction of Active Particles for to use a dual tree"),
        float("fndd", "dFracNoDomainDecomp", 0.1, "Fraction of Active Particles for no DD"),
        float("fndrf", "dFracNoDomainRootFind", 0.1, "Fraction of Active Particles for no DD root finding"),
        float("fnddc", "dFracNoDomainDimChoice", 0.1, "Fraction of Active Particles for no DD dimension choice"),
    ]
}

#[rustfmt::skip]
fn analysis() -> Vec<OptionDescriptor> {
    vec![
        int_unset("npk", "nBinsPk", "Number of log bins for P(k)"),
        int("pk", "nGridPk", 0, "Grid size for measure P(k) 0=disabled"),
        toggle("pkinterlace", "bPkInterlace", true, "Use interlacing to measure P(k)"),
        int("pko", "iPkOrder", 4, "Mass assignment order for measuring P(k)"),
        toggle("groupfinder", "bFindGroups", false, "enable group finder"),
        toggle("hop", "bFindHopGroups", false, "enable phase-space group finder"),
        float("hoptau", "dHopTau", -4.0, "linking length for Gasshopper (negative for multiples of softening)"),
        int("nMinMembers", "nMinMembers", 10, "minimum number of group members"),
        float("tau", "dTau", 0.164, "linking length for FOF in units of mean particle separation"),
        float("dEnv0", "dEnvironment0", -1.0, "first radius for density environment about a group"),
        float("dEnv1", "dEnvironment1", -1.0, "second radius for density environment about a group"),
        toggle("lc", "bLightCone", false, "output light cone data"),
        float("zlcp", "dRedshiftLCP", 0.0, "starting redshift to output light cone particles"),
        float("zdel", "dDeltakRedshift", 0.0, "starting redshift to output delta(k) field"),
        int("healpix", "nSideHealpix", 8192, "Number per side of the healpix map"),
        toggle("lcp", "bLightConeParticles", false, "output light cone particles"),
    ]
}

#[rustfmt::skip]
fn io_parameters() -> Vec<OptionDescriptor> {
    vec![
        text_unset("I", "achInFile", "input file name"),
        text("o", "achOutName", "pkdgrav3", "output name for snapshots and logfile"),
        text("op", "achOutPath", "", "output path for snapshots and logfile"),
        text("iop", "achIoPath", "", "output path for snapshots and logfile"),
        text("cpp", "achCheckpointPath", "", "output path for checkpoints"),
        text("dsp", "achDataSubPath", "", "sub-path for data"),
        toggle("lcin", "bInFileLC", false, "input light cone data"),
        toggle("par", "bParaRead", true, "enable parallel reading of files"),
        toggle("paw", "bParaWrite", false, "disable parallel writing of files"),
        int("npar", "nParaRead", 0, "number of threads to read with during parallel read (0=unlimited)"),
        int("npaw", "nParaWrite", 0, "number of threads to write with during parallel write (0=unlimited)"),
        int("oi", "iOutInterval", 0, "number of timesteps between snapshots"),
        int("fof", "iFofInterval", 0, "number of timesteps between fof group finding"),
        int("ci", "iCheckInterval", 0, "number of timesteps between checkpoints"),
        int("ol", "iLogInterval", 1, "number of timesteps between logfile outputs"),
        int("opk", "iPkInterval", 1, "number of timesteps between pk outputs"),
        int("odk", "iDeltakInterval", 0, "number of timesteps between DeltaK outputs"),
        toggle("hdf5", "bHDF5", false, "output in HDF5 format"),
        toggle("dp", "bDoublePos", false, "input/output double precision positions (standard format only)"),
        toggle("dv", "bDoubleVel", false, "input/output double precision velocities (standard format only)"),
        toggle("softout", "bDoSoftOutput", false, "enable soft outputs"),
        toggle("den", "bDoDensity", true, "enable density outputs"),
        toggle("accout", "bDoAccOutput", false, "enable acceleration outputs"),
        toggle("potout", "bDoPotOutput", false, "enable potential outputs"),
        toggle("rungout", "bDoRungOutput", false, "enable rung outputs"),
        toggle("rungdestout", "bDoRungDestOutput", false, "enable rung destination outputs"),
        toggle("std", "bStandard", true, "output in standard TIPSY binary format"),
        int("compress", "iCompress", 0, "compression format, 0=none, 1=gzip, 2=bzip2"),
        int("wall", "iWallRunTime", 0, "Maximum Wallclock time (in minutes) to run"),
        int("signal", "iSignalSeconds", 0, "Time (in seconds) that USR1 is sent before termination"),
        toggle("rtrace", "bTraceRelaxation", false, "enable relaxation tracing"),
        toggle("restart", "bRestart", false, "restart from checkpoint"),
        OptionDescriptor::repeatable("orbit", "lstOrbits", ValueType::Int, "Particle ID of particle to write to orbit file (repeatable)"),
    ]
}

#[rustfmt::skip]
fn time_stepping() -> Vec<OptionDescriptor> {
    vec![
        int("nstart", "iStartStep", 0, "initial step numbering"),
        int("n", "nSteps", 0, "number of timesteps"),
        int("n10", "nSteps10", 0, "number of timesteps to z=10"),
        float("zto", "dRedTo", 0.0, "specifies final redshift for the simulation"),
        float("dt", "dDelta", 0.0, "time step"),
        float("eta", "dEta", 0.2, "time step criterion"),
        toggle("gs", "bGravStep", false, "Gravity timestepping according to iTimeStep Criterion"),
        toggle("ea", "bEpsAccStep", false, "Sqrt(Epsilon on a) timestepping"),
        toggle("isrho", "bDensityStep", false, "Sqrt(1/Rho) timestepping"),
        int("tsc", "iTimeStepCrit", 0, "Criteria for dynamical time-stepping"),
        int("nprholoc", "nPartRhoLoc", 32, "Number of particles for local density in dynamical time-stepping"),
        float("dprefacrholoc", "dPreFacRhoLoc", PI * 4.0 / 3.0, "Pre-factor for local density in dynamical time-stepping"),
        float("deccfacmax", "dEccFacMax", 3000.0, "Maximum correction factor for eccentricity correction"),
        int("npcoll", "nPartColl", 0, "Number of particles in collisional regime"),
        int_unset("mrung", "iMaxRung", "maximum timestep rung"),
        toggle("NewKDK", "bNewKDK", false, "Use new implementation of KDK time stepping=no"),
        int("nTR", "nTruncateRung", 0, "number of MaxRung particles to delete MaxRung"),
        int_unset("nvactrung", "nRungVeryActive", "timestep rung to use very active timestepping"),
        int("nvactpart", "nPartVeryActive", 0, "number of particles to use very active timestepping"),
    ]
}

#[rustfmt::skip]
fn force_accuracy() -> Vec<OptionDescriptor> {
    vec![
        float("theta", "dTheta", 0.7, "Barnes opening criterion"),
        float_unset("theta20", "dTheta20", "Barnes opening criterion for 2 < z <= 20"),
        float_unset("theta2", "dTheta2", "Barnes opening criterion for z <= 2"),
    ]
}

#[rustfmt::skip]
fn periodic_boundaries() -> Vec<OptionDescriptor> {
    vec![
        toggle("cm", "bComove", false, "enable comoving coordinates"),
        toggle("p", "bPeriodic", false, "periodic/non-periodic"),
        toggle("ewald", "bEwald", true, "enable Ewald correction"),
        int("ewo", "iEwOrder", 4, "Ewald multipole expansion order: 1, 2, 3 or 4"),
        int_unset("nrep", "nReplicas", "nReplicas"),
        float("L", "dPeriod", 1.0, "periodic box length"),
        float("Lx", "dxPeriod", 1.0, "periodic box length in x-dimension"),
        float("Ly", "dyPeriod", 1.0, "periodic box length in y-dimension"),
        float("Lz", "dzPeriod", 1.0, "periodic box length in z-dimension"),
        float("ew", "dEwCut", 2.6, "dEwCut"),
        float("ewh", "dEwhCut", 2.8, "dEwhCut"),
    ]
}

#[rustfmt::skip]
fn cosmology() -> Vec<OptionDescriptor> {
    vec![
        float("Hub", "dHubble0", (PI * 8.0 / 3.0).sqrt(), "dHubble0"),
        float("Om", "dOmega0", 1.0, "dOmega0"),
        float("Lambda", "dLambda", 0.0, "dLambda"),
        float("omDE", "dOmegaDE", 0.0, "Omega for Dark Energy using w0 and wa parameters: <dOmegaDE"),
        float("w0", "w0", -1.0, "w0 parameter for Dark Energy <w0"),
        float("wa", "wa", 0.0, "wa parameter for Dark Energy <wa"),
        float("Omrad", "dOmegaRad", 0.0, "dOmegaRad"),
        float("Omb", "dOmegab", 0.0, "dOmegab"),
        float("S8", "dSigma8", 0.0, "dSigma8").exclusive_in(NORMALIZATION_SET),
        float("As", "dNormalization", 0.0, "dNormalization").exclusive_in(NORMALIZATION_SET),
        float("ns", "dSpectral", 0.0, "dSpectral"),
        float("alphas", "dRunning", 0.0, "Primordial tilt running: <dRunning"),
        float("kpivot", "dPivot", 0.05, "Primordial pivot scale in 1/Mpc (not h/Mpc): <dPivot"),
        toggle("class", "bClass", false, "Enable/disable the use of CLASS"),
        text_unset("class_filename", "achClassFilename", "Name of hdf5 file containing the CLASS data"),
        text_unset("lin_species", "achLinSpecies", "plus-separated string of linear species, e.g. \"ncdm[0]+g+metric\""),
        text_unset("pk_species", "achPkSpecies", "plus-separated string of species for P(k)"),
        float("h", "h", 0.0, "hubble parameter h"),
        float("mpc", "dBoxSize", 1.0, "Simulation Box size in Mpc"),
        text_unset("tf", "achTfFile", "transfer file name (file in CMBFAST format)"),
    ]
}

#[rustfmt::skip]
fn initial_conditions() -> Vec<OptionDescriptor> {
    vec![
        float_unset("z", "dRedFrom", "specifies initial redshift for the simulation"),
        int("grid", "nGrid", 0, "Grid size for IC 0=disabled"),
        int("seed", "iSeed", 0, "Random seed for IC"),
        toggle("2lpt", "b2LPT", true, "Enable/disable 2LPT"),
        toggle("wic", "bWriteIC", false, "Write IC after generating"),
        toggle("fixedamp", "bFixedAmpIC", false, "Use fixed amplitude of 1 for ICs"),
        float("fixedphase", "dFixedAmpPhasePI", 0.0, "Phase shift for fixed amplitude in units of PI"),
    ]
}

#[rustfmt::skip]
fn memory_model() -> Vec<OptionDescriptor> {
    vec![
        int("b", "nBucket", 16, "max number of particles in a bucket"),
        int("grp", "nGroup", 64, "max number of particles in a group"),
        float("extra", "dExtraStore", 0.1, "Extra storage for particles"),
        int("treelo", "nTreeBitsLo", 14, "number of low bits for tree"),
        int("treehi", "nTreeBitsHi", 18, "number of high bits for tree"),
        toggle("integer", "bMemIntegerPosition", false, "Particles have integer positions"),
        toggle("unordered", "bMemUnordered", false, "Particles have no specific order"),
        toggle("pid", "bMemParticleID", false, "Particles have a unique identifier"),
        toggle("Ma", "bMemAcceleration", false, "Particles have acceleration"),
        toggle("Mv", "bMemVelocity", false, "Particles have velocity"),
        toggle("Mp", "bMemPotential", false, "Particles have potential"),
        toggle("Mg", "bMemGroups", false, "Particles support group finding"),
        toggle("Mm", "bMemMass", false, "Particles have individual masses"),
        toggle("Ms", "bMemSoft", false, "Particles have individual softening"),
        toggle("Mr", "bMemRelaxation", false, "Particles have relaxation"),
        toggle("Mvs", "bMemVelSmooth", false, "Particles support velocity smoothing"),
        toggle("MNm", "bMemNodeMoment", false, "Tree nodes support multipole moments"),
        toggle("MNa", "bMemNodeAcceleration", false, "Tree nodes support acceleration (for bGravStep)"),
        toggle("MNv", "bMemNodeVelocity", false, "Tree nodes support velocity (for iTimeStepCrit = 1)"),
        toggle("MNsph", "bMemNodeSphBounds", false, "Tree nodes support fast-gas bounds"),
        toggle("MNbnd", "bMemNodeBnd", true, "Tree nodes support 3D bounds"),
        toggle("MNvbnd", "bMemNodeVBnd", false, "Tree nodes support velocity bounds"),
    ]
}

#[rustfmt::skip]
fn gas_parameters() -> Vec<OptionDescriptor> {
    vec![
        int("s", "nSmooth", 64, "number of particles to smooth over"),
        toggle("gas", "bDoGas", false, "calculate gas/do not calculate gas"),
        toggle("GasAdiabatic", "bGasAdiabatic", true, "Gas is Adiabatic"),
        toggle("GasIsothermal", "bGasIsothermal", false, "Gas is Isothermal"),
        toggle("GasCooling", "bGasCooling", false, "Gas is Cooling"),
        toggle("bInitTFromCooling", "bInitTFromCooling", false, "set T (also E, Y, etc..) using Cooling initialization value"),
        int("iRungCoolTableUpdate", "iRungCoolTableUpdate", 0, "Rung on which to update cool tables"),
        float("etaC", "dEtaCourant", 0.4, "Courant criterion"),
        float("etau", "dEtaUDot", 0.25, "uDot timestep criterion"),
        float("alpha", "dConstAlpha", 1.0, "Alpha constant in viscosity"),
        float("beta", "dConstBeta", 2.0, "Beta constant in viscosity"),
        float("gamma", "dConstGamma", 5.0 / 3.0, "Ratio of specific heats"),
        float("mmw", "dMeanMolWeight", 1.0, "Mean molecular weight in amu"),
        float("gcnst", "dGasConst", 1.0, "Gas Constant"),
        float("kb", "dKBoltzUnit", 1.0, "Boltzmann Constant in System Units"),
        float("hmin", "dhMinOverSoft", 0.0, "Minimum h as a fraction of Softening"),
        float("metaldiff", "dMetalDiffusionCoeff", 0.0, "Coefficient in Metal Diffusion"),
        float("thermaldiff", "dThermalDiffusionCoeff", 0.0, "Coefficient in Thermal Diffusion"),
        float("msu", "dMsolUnit", 1.0, "Solar mass/system mass unit"),
        float("kpcu", "dKpcUnit", 1000.0, "Kiloparsec/system length unit"),
        float("dhonh", "ddHonHLimit", 0.1, "|dH|/H Limiter"),
        int("vlim", "iViscosityLimiter", 1, "iViscosity Limiter"),
        int("idiff", "iDiffusion", 0, "iDiffusion"),
        toggle("adddel", "bAddDelete", false, "Add Delete Particles"),
        toggle("stfm", "bStarForm", false, "Star Forming"),
        toggle("fdbk", "bFeedback", false, "Stars provide feedback"),
        float("stODmin", "SFdComovingDenMin", 0.0, "Minimum overdensity for forming stars"),
        float("stPDmin", "SFdPhysDenMin", 0.1 / 0.76 * 1.66e-24, "Minimum physical density for forming stars (gm/cc)"),
        float("ESNPerStarMass", "SFdESNPerStarMass", 5027652100000000.0, "ESN per star mass, erg per g of stars"),
        float("SFdTMax", "SFdTMax", 1e20, "Maximum temperature for forming stars, K"),
        float("SFdEfficiency", "SFdEfficiency", 0.01, "SF Efficiency"),
        float("SFdtCoolingShutoff", "SFdtCoolingShutoff", 30000000.0, "SF Cooling Shutoff duration"),
        float("SFdtFBD", "SFdtFeedbackDelay", 10000000.0, "SF FB delay"),
        float("SFMLPSM", "SFdMassLossPerStarMass", 0.1, "SFMSPSM "),
        float("SFZMPSM", "SFdZMassPerStarMass", 0.01, "SF ZMPSM"),
        float("SFISM", "SFdInitStarMass", 0.0, "SF ISM"),
        float("SFMGM", "SFdMinGasMass", 0.0, "SF MGM"),
        float("SFVFB", "SFdvFB", 100.0, "SF dvFB sound speed in FB region expected, km/s"),
        toggle("SFbdivv", "SFbdivv", false, "SF Use div v for star formation"),
    ]
}

#[rustfmt::skip]
fn diagnostics() -> Vec<OptionDescriptor> {
    vec![
        toggle("nograv", "bNoGrav", false, "enable gravity calulation for testing"),
        toggle("dedicated", "bDedicatedMPI", false, "enable dedicated MPI thread"),
        toggle("sharedmpi", "bSharedMPI", false, "enable extra dedicated MPI thread"),
        toggle("overwrite", "bOverwrite", false, "enable overwrite safety lock"),
        toggle("vwarnings", "bVWarnings", true, "enable warnings"),
        toggle("vstart", "bVStart", true, "enable verbose start"),
        toggle("vstep", "bVStep", true, "enable verbose step"),
        toggle("vrungstat", "bVRungStat", true, "enable rung statistics"),
        toggle("vdetails", "bVDetails", false, "enable verbose details"),
        int("nd", "nDigits", 5, "number of digits to use in output filenames"),
        int("cs", "iCacheSize", 0, "size of the MDL cache (0=default)"),
        int("wqs", "iWorkQueueSize", 0, "size of the MDL work queue"),
        int("cqs", "iCUDAQueueSize", 8, "size of the CUDA work queue"),
    ]
}
