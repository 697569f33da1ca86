pub(super) const DESCRIPTORS: &[&str] = &[
    "agile", "amber", "ancient", "austere", "bold", "brave", "breezy", "bright", "calm", "clever",
    "cosmic", "crimson", "curious", "dapper", "daring", "eager", "early", "elegant", "fancy", "fearless",
    "fluffy", "frosty", "gentle", "giddy", "golden", "grumpy", "happy", "hasty", "honest", "humble",
    "icy", "jolly", "kindly", "lazy", "limber", "lucky", "mellow", "misty", "modest", "nimble",
    "noble", "odd", "patient", "plucky", "polite", "proud", "quiet", "quirky", "rapid", "rusty",
    "sandy", "shy", "silent", "silver", "sleepy", "snappy", "solemn", "spry", "steady", "stormy",
    "sunny", "swift", "tame", "tender", "tidy", "torpid", "vivid", "wandering", "wiry", "witty",
    "zealous", "zesty",
];

pub(super) const ANIMALS: &[&str] = &[
    "albatross", "alpaca", "ant", "antelope", "badger", "bat", "beaver", "bee", "bison", "boar",
    "buffalo", "camel", "cat", "cheetah", "chipmunk", "cobra", "condor", "coyote", "crab", "crane",
    "crow", "deer", "dingo", "dolphin", "donkey", "dragonfly", "eagle", "eel", "elk", "emu",
    "falcon", "ferret", "finch", "fox", "frog", "gazelle", "gecko", "gibbon", "giraffe", "goat",
    "goose", "gopher", "gorilla", "hamster", "hare", "hawk", "hedgehog", "heron", "hippo", "horse",
    "hyena", "ibis", "iguana", "impala", "jackal", "jaguar", "kangaroo", "koala", "lemur", "leopard",
    "lion", "llama", "lobster", "lynx", "magpie", "marmot", "meerkat", "mink", "mole", "moose",
    "narwhal", "newt", "ocelot", "octopus", "orca", "ostrich", "otter", "owl", "panda", "panther",
    "parrot", "pelican", "penguin", "pig", "puffin", "puma", "quail", "rabbit", "raccoon", "raven",
    "robin", "salmon", "seal", "shark", "sheep", "skunk", "sloth", "snail", "sparrow", "squid",
    "squirrel", "stork", "swan", "tapir", "tiger", "toad", "turkey", "turtle", "viper", "vulture",
    "walrus", "weasel", "whale", "wolf", "wombat", "yak", "zebra",
];
